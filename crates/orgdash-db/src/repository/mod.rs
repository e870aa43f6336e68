//! SurrealDB repository implementations.

mod invitation;
mod org;
mod role_assignment;
mod task_state;

pub use invitation::SurrealInvitationRepository;
pub use org::SurrealOrgRepository;
pub use role_assignment::SurrealRoleAssignmentRepository;
pub use task_state::SurrealTaskStateRepository;
