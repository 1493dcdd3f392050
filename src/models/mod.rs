pub mod patient;

pub use patient::PatientScanRecord;
