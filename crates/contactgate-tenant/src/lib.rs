//! Gateway-injected tenant identity types shared by ContactGate services.

pub mod identity;

pub use identity::TenantHeaders;
