/// Router Module Index
///
/// Organizes routing into access-level modules. Access control is applied per
/// module as an Axum layer in `create_router`, so a route's protection is
/// decided by which module it is registered in.

/// Routes open to anonymous clients.
pub mod public;

/// Routes behind the bearer-token middleware. Role gates (`Landlord`) run as
/// extractors inside individual handlers.
pub mod authenticated;

/// Routes restricted to ADMIN users, nested under `/api/admin`.
pub mod admin;
