//! Shared traits for ledger records.

/// Supplies the signed-flow view of a record used by filters and totals.
pub trait Amounted {
    fn amount(&self) -> f64;
    fn is_expense(&self) -> bool;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

impl<T: Amounted + ?Sized> Amounted for &T {
    fn amount(&self) -> f64 {
        (**self).amount()
    }

    fn is_expense(&self) -> bool {
        (**self).is_expense()
    }
}
