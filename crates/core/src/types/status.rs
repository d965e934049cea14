//! Status enums for the association's domain entities.
//!
//! The string forms are the Italian values the registry has always used; they
//! are stored as `PostgreSQL` enum types (see the server migrations) and shown
//! verbatim in the UI.

use core::fmt;

use serde::{Deserialize, Serialize};

macro_rules! impl_as_str_display {
    ($ty:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            /// Stable string form (database / query-string value).
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// All variants, for rendering `<select>` options.
            #[must_use]
            pub const fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Membership status of an adult or junior member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "member_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    Attivo,
    Sospeso,
    Dimesso,
    Decaduto,
    InAspettativa,
    InCongedo,
}

impl_as_str_display!(MemberStatus {
    Attivo => "attivo",
    Sospeso => "sospeso",
    Dimesso => "dimesso",
    Decaduto => "decaduto",
    InAspettativa => "in_aspettativa",
    InCongedo => "in_congedo",
});

/// Kind of membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "member_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MemberType {
    #[default]
    Ordinario,
    Fondatore,
    /// Junior registry rows carry this value.
    Giovane,
}

impl_as_str_display!(MemberType {
    Ordinario => "ordinario",
    Fondatore => "fondatore",
    Giovane => "giovane",
});

/// Operational status of a volunteer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "volunteer_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerStatus {
    #[default]
    Aspirante,
    Operativo,
    NonOperativo,
    InFormazione,
}

impl_as_str_display!(VolunteerStatus {
    Aspirante => "aspirante",
    Operativo => "operativo",
    NonOperativo => "non_operativo",
    InFormazione => "in_formazione",
});

/// Lifecycle status of an event/intervention. Open events drive the
/// operations-center map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "event_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Aperto,
    Chiuso,
}

impl_as_str_display!(EventStatus {
    Aperto => "aperto",
    Chiuso => "chiuso",
});

/// Fleet status of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "vehicle_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    Operativo,
    InManutenzione,
    FuoriServizio,
    Dismesso,
}

impl_as_str_display!(VehicleStatus {
    Operativo => "operativo",
    InManutenzione => "in_manutenzione",
    FuoriServizio => "fuori_servizio",
    Dismesso => "dismesso",
});

/// Category of a fleet asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "vehicle_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    #[default]
    Veicolo,
    Natante,
    Rimorchio,
}

impl_as_str_display!(VehicleType {
    Veicolo => "veicolo",
    Natante => "natante",
    Rimorchio => "rimorchio",
});

/// Assignment status of a radio or other comms device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "radio_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum RadioStatus {
    #[default]
    Disponibile,
    Assegnata,
    InManutenzione,
    FuoriServizio,
}

impl_as_str_display!(RadioStatus {
    Disponibile => "disponibile",
    Assegnata => "assegnata",
    InManutenzione => "in_manutenzione",
    FuoriServizio => "fuori_servizio",
});

/// Draft/sent state of a newsletter. The wire values have always been
/// English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "newsletter_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum NewsletterStatus {
    #[default]
    Draft,
    Scheduled,
    Sent,
}

impl_as_str_display!(NewsletterStatus {
    Draft => "draft",
    Scheduled => "scheduled",
    Sent => "sent",
});

/// Lifecycle of a scheduler deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "scheduler_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerStatus {
    #[default]
    InAttesa,
    InCorso,
    Completato,
    Scaduto,
}

impl_as_str_display!(SchedulerStatus {
    InAttesa => "in_attesa",
    InCorso => "in_corso",
    Completato => "completato",
    Scaduto => "scaduto",
});

/// Priority of a scheduler deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "scheduler_priority", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPriority {
    Bassa,
    #[default]
    Media,
    Alta,
    Urgente,
}

impl_as_str_display!(SchedulerPriority {
    Bassa => "bassa",
    Media => "media",
    Alta => "alta",
    Urgente => "urgente",
});

/// Kind of assembly or board meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "meeting_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MeetingType {
    AssembleaOrdinaria,
    AssembleaStraordinaria,
    ConsiglioDirettivo,
    RiunioneCapisquadra,
    RiunioneNucleo,
    #[default]
    AltraRiunione,
}

impl MeetingType {
    /// Human-readable Italian name shown in listings and prints.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AssembleaOrdinaria => "Assemblea dei Soci Ordinaria",
            Self::AssembleaStraordinaria => "Assemblea dei Soci Straordinaria",
            Self::ConsiglioDirettivo => "Consiglio Direttivo",
            Self::RiunioneCapisquadra => "Riunione dei Capisquadra",
            Self::RiunioneNucleo => "Riunione di Nucleo",
            Self::AltraRiunione => "Altra Riunione",
        }
    }
}

impl_as_str_display!(MeetingType {
    AssembleaOrdinaria => "assemblea_ordinaria",
    AssembleaStraordinaria => "assemblea_straordinaria",
    ConsiglioDirettivo => "consiglio_direttivo",
    RiunioneCapisquadra => "riunione_capisquadra",
    RiunioneNucleo => "riunione_nucleo",
    AltraRiunione => "altra_riunione",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_status_serializes_to_italian_snake_case() {
        let json = serde_json::to_string(&MemberStatus::Attivo).expect("serialize");
        assert_eq!(json, "\"attivo\"");
        let back: MemberStatus = serde_json::from_str("\"in_aspettativa\"").expect("deserialize");
        assert_eq!(back, MemberStatus::InAspettativa);
    }

    #[test]
    fn event_status_display_matches_query_string_value() {
        assert_eq!(EventStatus::Aperto.to_string(), "aperto");
        assert_eq!(EventStatus::Chiuso.to_string(), "chiuso");
    }

    #[test]
    fn vehicle_status_uses_snake_case_values() {
        assert_eq!(VehicleStatus::InManutenzione.as_str(), "in_manutenzione");
        let back: VehicleStatus = serde_json::from_str("\"fuori_servizio\"").expect("deserialize");
        assert_eq!(back, VehicleStatus::FuoriServizio);
    }

    #[test]
    fn meeting_type_labels_are_full_italian_names() {
        assert_eq!(
            MeetingType::AssembleaOrdinaria.label(),
            "Assemblea dei Soci Ordinaria"
        );
        assert_eq!(MeetingType::AltraRiunione.as_str(), "altra_riunione");
    }

    #[test]
    fn all_lists_every_variant() {
        assert_eq!(MemberStatus::all().len(), 6);
        assert_eq!(SchedulerPriority::all().len(), 4);
    }
}
