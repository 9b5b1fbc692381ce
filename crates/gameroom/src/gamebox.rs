use crate::PlayerId;
use dealroom_core::Money;

/// One of the 20 numbered boxes on the board. `value` is hidden from every
/// projection until `is_opened` is true.
#[derive(Debug, Clone, Copy)]
pub struct GameBox {
    number: u8,
    value: Money,
    is_opened: bool,
    opened_by: Option<PlayerId>,
}

impl GameBox {
    pub fn new(number: u8, value: Money) -> Self {
        Self {
            number,
            value,
            is_opened: false,
            opened_by: None,
        }
    }
    pub fn number(&self) -> u8 {
        self.number
    }
    pub fn value(&self) -> Money {
        self.value
    }
    pub fn is_opened(&self) -> bool {
        self.is_opened
    }
    pub fn opened_by(&self) -> Option<PlayerId> {
        self.opened_by
    }
    /// Opens the box. `opener` is `None` for the last-standing auto-reveal,
    /// where the box is the owning contestant's own and no other player
    /// performed the open.
    pub fn open(&mut self, opener: Option<PlayerId>) {
        self.is_opened = true;
        self.opened_by = opener;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let b = GameBox::new(1, 100.0);
        assert!(!b.is_opened());
        assert!(b.opened_by().is_none());
    }

    #[test]
    fn open_records_opener() {
        let mut b = GameBox::new(7, 500.0);
        let opener = PlayerId::default();
        b.open(Some(opener));
        assert!(b.is_opened());
        assert_eq!(b.opened_by(), Some(opener));
    }

    #[test]
    fn auto_reveal_has_no_opener() {
        let mut b = GameBox::new(7, 500.0);
        b.open(None);
        assert!(b.is_opened());
        assert!(b.opened_by().is_none());
    }
}
