mod chapter;
mod config;
pub mod dates;
mod ids;
mod name;
mod subject;

pub use chapter::{Chapter, ChapterPatch, Criterion};
pub use config::{Config, ConfigPatch, DEFAULT_BRAND_SUBTITLE, DEFAULT_BRAND_TITLE};
pub use ids::{ChapterId, ParseIdError, SubjectId};
pub use name::Name;
pub use subject::Subject;
