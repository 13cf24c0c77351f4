mod bill;
pub use self::bill::{BillHistory, CongressHouse, Significance, UnknownSignificance};
