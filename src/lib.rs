#![forbid(unsafe_code)]
//! mailvet — vérification d'adresses e-mail par lots
//!
//! Each address goes through three stages, stopping at the first failure:
//! [`syntax`] check, [`resolver`] (MX, falling back to A/AAAA) and an SMTP
//! [`probe`] of the recipient. [`verify`] sequences them and paces batches;
//! [`batch`] reads and writes the CSV sheets.

pub mod batch;
pub mod probe;
pub mod resolver;
pub mod syntax;
pub mod verify;

pub use batch::{AddressSheet, BatchError, read_sheet, read_sheet_path, write_sheet, write_sheet_path};
pub use probe::{Probe, ProbeError, ProbeOptions, ProbeVerdict, SmtpProber};
pub use resolver::{DnsResolver, LookupMx, MxCandidate, MxRecord, ResolverError, resolve};
pub use verify::{
    BatchReport, PacingRange, Stage, TracingObserver, VerificationResult, Verifier, VerifyConfig,
    VerifyObserver,
};
