// Job Harvester and the statistics pipeline it feeds.
// board (HTTP + HTML) → harvester (persist new postings) → stats (extract + aggregate),
// orchestrated by pipeline and driven on a timer by scheduler.

pub mod board;
pub mod handlers;
pub mod harvester;
pub mod pipeline;
pub mod scheduler;
pub mod stats;
