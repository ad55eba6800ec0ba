mod appointment;
mod patient;
mod user;

pub use appointment::{Appointment, AppointmentInput};
pub use patient::{HistoryEntry, HistoryInput, Patient, PatientInput, PatientStatistics, Sex};
pub use user::{User, UserStatistics, UserUpdate};
