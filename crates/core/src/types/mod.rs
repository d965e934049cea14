//! Core type definitions.

pub mod fiscal_code;
pub mod id;
pub mod permission;
pub mod status;

pub use fiscal_code::{FiscalCode, FiscalCodeError};
pub use permission::{Action, Module, PermissionGrant, PermissionKey, PermissionSet, Source};
pub use status::{
    EventStatus, MeetingType, MemberStatus, MemberType, NewsletterStatus, RadioStatus,
    SchedulerPriority, SchedulerStatus, VehicleStatus, VehicleType, VolunteerStatus,
};

crate::define_id!(UserId);
crate::define_id!(RoleId);
crate::define_id!(PermissionId);
crate::define_id!(MemberId);
crate::define_id!(JuniorMemberId);
crate::define_id!(EventId);
crate::define_id!(MeetingId);
crate::define_id!(AgendaItemId);
crate::define_id!(VehicleId);
crate::define_id!(AppointmentId);
crate::define_id!(ConsentId);
crate::define_id!(RegistryEntryId);
crate::define_id!(NewsletterId);
crate::define_id!(SchedulerItemId);
crate::define_id!(RadioId);
crate::define_id!(OnCallShiftId);
crate::define_id!(PrintTemplateId);
