// Skill-demand pipeline: catalog → extraction → demand scoring → recommendations.
// Everything here except `catalog::SkillCatalog::load_or_seed` and the handlers is pure.

pub mod catalog;
pub mod demand;
pub mod extractor;
pub mod handlers;
pub mod recommend;
mod stopwords;
