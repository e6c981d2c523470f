//! Domain types for the server.
//!
//! These are validated domain objects, separate from the raw row types the
//! repositories read. They serialize directly into API responses.

pub mod current_user;
pub mod lot;
pub mod parking_session;
pub mod payment;
pub mod ticket;
pub mod user;

pub use current_user::{CurrentUser, session_keys};
pub use lot::ParkingLot;
pub use parking_session::{ParkingSession, SessionOverview, SessionWithLot};
pub use payment::Payment;
pub use ticket::{SupportTicket, TicketMessage};
pub use user::User;
