use futures::future::join_all;
use tracing::{debug, warn};

use crate::entity::{EntityKind, EntityResolver, UNKNOWN_NAME};
use crate::images::ImageLoader;
use crate::record::{CatalogEntry, DisplayRecord, EntityRef, PageCursor, RosterItem};

/// Joins a catalog entry with its school and sport lookups and images.
#[derive(Clone)]
pub struct RecordAssembler {
    resolver: EntityResolver,
    images: ImageLoader,
}

impl RecordAssembler {
    pub fn new(resolver: EntityResolver, images: ImageLoader) -> Self {
        Self { resolver, images }
    }

    /// Always yields a record; unresolvable pieces become placeholders.
    pub async fn assemble(&self, entry: CatalogEntry, next_page: PageCursor) -> DisplayRecord {
        let (thumbnail, schools, sports) = tokio::join!(
            self.images.load(&entry.images.medium),
            self.roster(EntityKind::School, &entry.schools),
            self.roster(EntityKind::Sport, &entry.sports),
        );
        debug!(title = %entry.title, schools = schools.len(), sports = sports.len(), "assembled record");
        DisplayRecord::new(entry.title, entry.duration, thumbnail, schools, sports, next_page)
    }

    // join_all keeps input order, so item i always belongs to refs[i].
    async fn roster(&self, kind: EntityKind, refs: &[EntityRef]) -> Vec<RosterItem> {
        join_all(refs.iter().map(|r| self.member(kind, r.id))).await
    }

    async fn member(&self, kind: EntityKind, id: u64) -> RosterItem {
        let (name, icon_url) = match self.resolver.resolve(kind, id).await {
            Ok(e) => (e.name, e.icon_url),
            Err(e) => {
                warn!(%kind, id, error = %e, "lookup failed, substituting");
                (UNKNOWN_NAME.to_string(), String::new())
            }
        };
        let icon = self.images.load(&icon_url).await;
        RosterItem { name, icon }
    }
}
