// Library root: season records, identity resolution, history assembly and
// feature windowing. Pure in-memory transforms; ingestion and export live in
// gridcast-app.

pub mod features;
pub mod history;
pub mod identity;
pub mod record;
