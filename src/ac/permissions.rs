use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    pub struct Capabilities: u64 {
        const USER_MANAGE = 1 << 0;
        const USER_STATS = 1 << 1;
        const PATIENT_READ = 1 << 2;
        const PATIENT_WRITE = 1 << 3;
        const PATIENT_STATS = 1 << 4;
        const APPOINTMENT_OWN = 1 << 5;
    }
}

/// The role stored on a staff account. It fully determines what the
/// account may do; there are no per-user grants on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    /// Manages staff accounts and sees everything
    Admin,
    /// Treats patients: full patient access plus their own appointments
    Dietitian,
    /// Front desk: patient records and their own appointments
    Receptionist,
}

impl Role {
    /// The set of capabilities this role grants.
    pub fn capabilities(self) -> Capabilities {
        match self {
            Role::Admin => Capabilities::all(),
            Role::Dietitian => {
                Capabilities::PATIENT_READ
                    | Capabilities::PATIENT_WRITE
                    | Capabilities::PATIENT_STATS
                    | Capabilities::APPOINTMENT_OWN
            }
            Role::Receptionist => {
                Capabilities::PATIENT_READ
                    | Capabilities::PATIENT_WRITE
                    | Capabilities::APPOINTMENT_OWN
            }
        }
    }

    pub fn can(self, needed: Capabilities) -> bool {
        self.capabilities().contains(needed)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::Admin => "admin",
            Role::Dietitian => "dietitian",
            Role::Receptionist => "receptionist",
        })
    }
}
