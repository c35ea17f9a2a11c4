/**
 * Content Kinds
 * Stored shapes, create payloads and patch payloads for each collection
 */
pub mod blog;
pub mod experience;
pub mod project;
pub mod skill;

pub use blog::BlogPost;
pub use experience::Experience;
pub use project::Project;
pub use skill::Skill;
