pub mod http;
pub mod process;
pub mod system;

pub use http::{HttpFetcher, HttpResponse, ReqwestFetcher, TlsVerification};
pub use process::{
    process_lookup, PgrepLookup, ProcessLookup, ProcessLookupKind, SysinfoProcessLookup,
};
pub use system::{LoadSource, SysinfoLoadSource};
