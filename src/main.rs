use dyeflow::{Field, Mask, SimConfig, Simulation};
use idek::{prelude::*, IndexBuffer};
use idek_basics::{idek, GraphicsBuilder};

fn main() -> Result<()> {
    env_logger::init();
    launch::<_, TunnelApp>(Settings::default().vr_if_any_args())
}

type Color = [f32; 3];

const DENSITY_Z: f32 = 0.5;
const VELOCITY_Z: f32 = 0.0;

const SOLID_COLOR: Color = [0.35, 0.35, 0.4];
const DYE_COLOR: Color = [0.2, 0.6, 1.0];

/// Frames between dye puffs dropped behind the body
const PUFF_PERIOD: usize = 90;

struct TunnelApp {
    line_verts: VertexBuffer,
    line_indices: IndexBuffer,
    line_gb: GraphicsBuilder,
    line_shader: Shader,

    tri_verts: VertexBuffer,
    tri_indices: IndexBuffer,
    tri_gb: GraphicsBuilder,

    sim: Simulation,

    frame_count: usize,
}

impl App for TunnelApp {
    fn init(ctx: &mut Context, _: &mut Platform, _: ()) -> Result<Self> {
        // Set up fluid sim
        let sim = Simulation::new(SimConfig::wind_tunnel(160, 90))?;
        log::info!("Wind tunnel {}x{}", sim.width(), sim.height());

        // Set up line buffer
        let mut line_gb = GraphicsBuilder::new();
        draw_velocity_lines(&mut line_gb, sim.read_velocity(), VELOCITY_Z);

        let line_verts = ctx.vertices(&line_gb.vertices, true)?;
        let line_indices = ctx.indices(&line_gb.indices, true)?;

        // Set up triangle buffer
        let mut tri_gb = GraphicsBuilder::new();
        draw_density(&mut tri_gb, sim.read_dye(), sim.grid().mask(), DENSITY_Z);

        let tri_verts = ctx.vertices(&tri_gb.vertices, true)?;
        let tri_indices = ctx.indices(&tri_gb.indices, true)?;

        let line_shader = ctx.shader(
            DEFAULT_VERTEX_SHADER,
            DEFAULT_FRAGMENT_SHADER,
            Primitive::Lines,
        )?;

        Ok(Self {
            line_verts,
            line_indices,
            line_gb,
            line_shader,

            tri_verts,
            tri_indices,
            tri_gb,

            sim,

            frame_count: 0,
        })
    }

    fn frame(&mut self, ctx: &mut Context, _: &mut Platform) -> Result<Vec<DrawCmd>> {
        // Modify
        self.frame_count += 1;
        if self.frame_count % PUFF_PERIOD == 0 {
            let (w, h) = (self.sim.width(), self.sim.height());
            self.sim.inject_dye(w / 2, h / 2, 1.)?;
        }

        self.sim.step();

        if let Some(err) = self.sim.instability() {
            log::error!("{}", err);
        }

        // Draw
        self.line_gb.clear();
        self.tri_gb.clear();

        draw_density(
            &mut self.tri_gb,
            self.sim.read_dye(),
            self.sim.grid().mask(),
            DENSITY_Z,
        );
        draw_velocity_lines(&mut self.line_gb, self.sim.read_velocity(), VELOCITY_Z);

        ctx.update_vertices(self.tri_verts, &self.tri_gb.vertices)?;
        ctx.update_vertices(self.line_verts, &self.line_gb.vertices)?;

        // Render
        Ok(vec![
            DrawCmd::new(self.tri_verts).indices(self.tri_indices),
            DrawCmd::new(self.line_verts)
                .indices(self.line_indices)
                .shader(self.line_shader),
        ])
    }

    fn event(&mut self, ctx: &mut Context, platform: &mut Platform, event: Event) -> Result<()> {
        idek::simple_ortho_cam_ctx(ctx, platform);
        idek::close_when_asked(platform, &event);
        Ok(())
    }
}

fn draw_density(builder: &mut GraphicsBuilder, dye: &Field, mask: &Mask, z: f32) {
    let width = dye.width();
    let height = dye.height();

    let cell_width = 2. / width as f32;
    let cell_height = 2. / height as f32;

    for i in 0..width {
        let i_frac = (i as f32 / width as f32) * 2. - 1.;
        for j in 0..height {
            let j_frac = (j as f32 / height as f32) * 2. - 1.;

            let color = if mask.is_solid(i, j) {
                SOLID_COLOR
            } else {
                let d = dye[(i, j)].clamp(0., 1.);
                DYE_COLOR.map(|c| c * d)
            };

            let mut push = |dx: f32, dy: f32| {
                let pos = [i_frac + dx, j_frac + dy, z];
                builder.push_vertex(Vertex::new(pos, color))
            };

            let tl = push(0., 0.);
            let tr = push(cell_width, 0.);

            let bl = push(0., cell_height);
            let br = push(cell_width, cell_height);

            builder.push_indices(&[bl, tr, tl, bl, br, tr]);
        }
    }
}

fn draw_velocity_lines(b: &mut GraphicsBuilder, (u, v): (&Field, &Field), z: f32) {
    let cell_width = 2. / u.width() as f32;
    let cell_height = 2. / u.height() as f32;

    let step = 5;

    for i in (0..u.width() - 1).step_by(step) {
        let i_frac = (i as f32 / u.width() as f32) * 2. - 1.;
        for j in (0..u.height() - 1).step_by(step) {
            let j_frac = (j as f32 / u.height() as f32) * 2. - 1.;

            // Cell centered velocity
            let (vx, vy) = dyeflow::advect::cell_velocity(u, v, i, j);

            let speed = (vx.powf(2.) + vy.powf(2.)).sqrt();

            let color = [speed.min(1.); 3];

            let mut push = |x: f32, y: f32| {
                let pos = [x, y, z];
                b.push_vertex(Vertex::new(pos, color))
            };

            let tail_x = i_frac + cell_width / 2.;
            let tail_y = j_frac + cell_height / 2.;
            let tail = push(tail_x, tail_y);

            // Fixed length; a still cell keeps a zero length line so the buffer size never changes
            let len = if speed > 0. { cell_height * 2. / speed } else { 0. };
            let tip = push(tail_x + vx * len, tail_y + vy * len);

            b.push_indices(&[tip, tail]);
        }
    }
}
