/// Dense row-major 2D storage. Index with `(x, y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Array2D<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Array2D<T> {
    pub fn from_array(width: usize, data: Vec<T>) -> Self {
        assert!(width > 0);
        assert_eq!(data.len() % width, 0);
        let height = data.len() / width;
        Self {
            width,
            height,
            data,
        }
    }

    pub fn new(width: usize, height: usize) -> Self
    where
        T: Default + Copy,
    {
        Self::filled(width, height, T::default())
    }

    pub fn filled(width: usize, height: usize, value: T) -> Self
    where
        T: Copy,
    {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    fn calc_index(&self, (x, y): (usize, usize)) -> usize {
        debug_assert!(x < self.width);
        debug_assert!(y < self.height);
        x + y * self.width
    }

    /// Checked access, `None` outside the array
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        (x < self.width && y < self.height).then(|| &self.data[self.calc_index((x, y))])
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x < self.width && y < self.height {
            let idx = self.calc_index((x, y));
            Some(&mut self.data[idx])
        } else {
            None
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn fill(&mut self, value: T)
    where
        T: Copy,
    {
        self.data.fill(value);
    }

    /// Overwrite this array with the contents of another of the same extent
    pub fn copy_from(&mut self, other: &Self)
    where
        T: Copy,
    {
        assert_eq!((self.width, self.height), (other.width, other.height));
        self.data.copy_from_slice(&other.data);
    }
}

impl<T> std::ops::Index<(usize, usize)> for Array2D<T> {
    type Output = T;
    fn index(&self, pos: (usize, usize)) -> &T {
        &self.data[self.calc_index(pos)]
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for Array2D<T> {
    fn index_mut(&mut self, pos: (usize, usize)) -> &mut T {
        let idx = self.calc_index(pos);
        &mut self.data[idx]
    }
}
