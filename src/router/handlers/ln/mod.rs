pub mod invoice;
pub mod pay;
