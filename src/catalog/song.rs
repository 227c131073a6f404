use core::cmp::Ordering;

use super::{PlaylistId, SongId};
use crate::AvlTree;
use crate::compare::Comparator;

/// A song and the playlists that currently reference it.
///
/// The membership set is the single source of truth for which playlists list this
/// song: a playlist's indexes hold the song iff the playlist's id is in here.
#[derive(Clone, Debug)]
pub struct Song {
    id: SongId,
    plays: i32,
    playlists: AvlTree<PlaylistId>,
}

impl Song {
    pub(crate) const fn new(id: SongId, plays: i32) -> Self {
        Self {
            id,
            plays,
            playlists: AvlTree::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> SongId {
        self.id
    }

    #[must_use]
    pub const fn plays(&self) -> i32 {
        self.plays
    }

    pub(crate) fn set_plays(&mut self, plays: i32) {
        self.plays = plays;
    }

    /// Playlists containing this song, ascending.
    pub fn playlists(&self) -> impl Iterator<Item = PlaylistId> + '_ {
        self.playlists.iter().copied()
    }

    #[must_use]
    pub fn is_in_playlist(&self, playlist: PlaylistId) -> bool {
        self.playlists.contains(&playlist)
    }

    #[must_use]
    pub fn is_in_any_playlist(&self) -> bool {
        !self.playlists.is_empty()
    }

    pub(crate) fn memberships_mut(&mut self) -> &mut AvlTree<PlaylistId> {
        &mut self.playlists
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BySongId;

impl Comparator<Song> for BySongId {
    fn compare(&self, a: &Song, b: &Song) -> Ordering {
        a.id.cmp(&b.id)
    }
}
