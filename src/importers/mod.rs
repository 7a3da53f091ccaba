// Import module - account workbook loader and inspection

pub mod account_excel;
pub mod inspect;

pub use account_excel::{
    list_sheets, load_account_workbook, AccountWorkbook, SheetNames, DEFAULT_ACCOUNT_SHEET,
    DEFAULT_PRICES_SHEET,
};
pub use inspect::{inspect_workbook, WorkbookInspection};
