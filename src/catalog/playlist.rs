use core::cmp::Ordering;

use super::{PlaylistId, SongId};
use crate::compare::Comparator;
use crate::dual_index::DualIndex;

/// A playlist: its songs indexed both by song id and by play count.
#[derive(Clone, Debug)]
pub struct Playlist {
    id: PlaylistId,
    songs: DualIndex<SongId, i32>,
}

impl Playlist {
    pub(crate) const fn new(id: PlaylistId) -> Self {
        Self {
            id,
            songs: DualIndex::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> PlaylistId {
        self.id
    }

    /// Number of songs in the playlist.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    #[must_use]
    pub fn contains(&self, song: SongId) -> bool {
        self.songs.contains(song)
    }

    /// Song ids in ascending order.
    pub fn songs(&self) -> impl Iterator<Item = SongId> + '_ {
        self.songs.iter_by_id().map(|entry| entry.id)
    }

    /// The song with the fewest plays that is still at or above `plays`; lowest id on ties.
    #[must_use]
    pub fn song_with_plays_at_least(&self, plays: i32) -> Option<SongId> {
        self.songs.first_at_or_above(plays).map(|entry| entry.id)
    }

    pub(crate) fn index(&self) -> &DualIndex<SongId, i32> {
        &self.songs
    }

    pub(crate) fn index_mut(&mut self) -> &mut DualIndex<SongId, i32> {
        &mut self.songs
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ByPlaylistId;

impl Comparator<Playlist> for ByPlaylistId {
    fn compare(&self, a: &Playlist, b: &Playlist) -> Ordering {
        a.id.cmp(&b.id)
    }
}
