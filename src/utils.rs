use crate::model::Price;

#[derive(Default)]
pub struct Average {
    value: Price,
    length: usize,
}

impl Average {
    pub fn feed(&mut self, value: Price) {
        self.value += value;
        self.length += 1;
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// `None` until at least one value has been fed.
    pub fn avg(&self) -> Option<Price> {
        if self.is_empty() {
            return None;
        }
        Some(self.value / self.length as Price)
    }
}

impl Extend<Price> for Average {
    fn extend<T: IntoIterator<Item = Price>>(&mut self, iter: T) {
        for value in iter {
            self.feed(value);
        }
    }
}
