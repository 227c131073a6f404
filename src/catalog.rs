//! A small music catalog built on [`AvlTree`] and [`DualIndex`].
//!
//! Songs carry a play count and the set of playlists that reference them. Each
//! playlist indexes its songs by id and by play count, so "the least-played song with
//! at least N plays" is a single closest-match query.

use thiserror::Error;
use tracing::debug;

use crate::AvlTree;
use crate::dual_index::{DualIndex, MembershipLedger};
use crate::error::IndexError;

mod playlist;
mod song;

pub use playlist::Playlist;
pub use song::Song;

use playlist::ByPlaylistId;
use song::BySongId;

pub type SongId = i32;
pub type PlaylistId = i32;

/// Why a catalog operation was refused.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CatalogError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("song {0} already exists")]
    SongExists(SongId),
    #[error("playlist {0} already exists")]
    PlaylistExists(PlaylistId),
    #[error("no song with id {0}")]
    NoSuchSong(SongId),
    #[error("no playlist with id {0}")]
    NoSuchPlaylist(PlaylistId),
    #[error("song {song} is already in playlist {playlist}")]
    AlreadyInPlaylist { playlist: PlaylistId, song: SongId },
    #[error("song {song} is not in playlist {playlist}")]
    NotInPlaylist { playlist: PlaylistId, song: SongId },
    #[error("playlist {0} still has songs")]
    PlaylistNotEmpty(PlaylistId),
    #[error("song {0} is still in a playlist")]
    SongInUse(SongId),
    #[error("no song in playlist {playlist} has at least {plays} plays")]
    NoMatch { playlist: PlaylistId, plays: i32 },
    #[error("play count of song {0} would overflow")]
    PlaysOverflow(SongId),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Coarse result vocabulary for callers that only need the outcome class.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Status {
    Success,
    Failure,
    InvalidInput,
    AllocationError,
}

impl CatalogError {
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            CatalogError::InvalidInput(_) => Status::InvalidInput,
            CatalogError::Index(IndexError::Alloc(_) | IndexError::CapacityExceeded { .. }) => Status::AllocationError,
            _ => Status::Failure,
        }
    }
}

impl<T> From<&Result<T, CatalogError>> for Status {
    fn from(result: &Result<T, CatalogError>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(err) => err.status(),
        }
    }
}

fn check_id(id: i32, what: &'static str) -> Result<(), CatalogError> {
    if id <= 0 {
        return Err(CatalogError::InvalidInput(what));
    }
    Ok(())
}

fn check_plays(plays: i32) -> Result<(), CatalogError> {
    if plays < 0 {
        return Err(CatalogError::InvalidInput("play count must not be negative"));
    }
    Ok(())
}

fn song_in(songs: &mut AvlTree<Song, BySongId>, id: SongId) -> Result<&mut Song, CatalogError> {
    songs.get_mut_by(|song| song.id().cmp(&id)).ok_or(CatalogError::NoSuchSong(id))
}

fn playlist_in(playlists: &mut AvlTree<Playlist, ByPlaylistId>, id: PlaylistId) -> Result<&mut Playlist, CatalogError> {
    playlists
        .get_mut_by(|playlist| playlist.id().cmp(&id))
        .ok_or(CatalogError::NoSuchPlaylist(id))
}

/// Songs and playlists.
///
/// # Examples
///
/// ```
/// use avl_index::Catalog;
///
/// let mut catalog = Catalog::new();
/// catalog.add_playlist(1)?;
/// catalog.add_song(10, 5)?;
/// catalog.add_song(11, 20)?;
/// catalog.add_to_playlist(1, 10)?;
/// catalog.add_to_playlist(1, 11)?;
///
/// assert_eq!(catalog.get_by_plays(1, 6)?, 11);
/// catalog.add_plays(10, 10)?;
/// assert_eq!(catalog.get_by_plays(1, 6)?, 10);
/// # Ok::<(), avl_index::CatalogError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    songs: AvlTree<Song, BySongId>,
    playlists: AvlTree<Playlist, ByPlaylistId>,
}

impl Catalog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            songs: AvlTree::with_comparator(BySongId),
            playlists: AvlTree::with_comparator(ByPlaylistId),
        }
    }

    #[must_use]
    pub fn song(&self, id: SongId) -> Option<&Song> {
        self.songs.get_by(|song| song.id().cmp(&id))
    }

    #[must_use]
    pub fn playlist(&self, id: PlaylistId) -> Option<&Playlist> {
        self.playlists.get_by(|playlist| playlist.id().cmp(&id))
    }

    /// Songs in ascending id order.
    pub fn songs(&self) -> impl Iterator<Item = &Song> + '_ {
        self.songs.iter()
    }

    /// Playlists in ascending id order.
    pub fn playlists(&self) -> impl Iterator<Item = &Playlist> + '_ {
        self.playlists.iter()
    }

    /// Creates an empty playlist.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidInput`] for a non-positive id,
    /// [`CatalogError::PlaylistExists`], or [`CatalogError::Index`] if no room could be
    /// made for it.
    pub fn add_playlist(&mut self, id: PlaylistId) -> Result<(), CatalogError> {
        check_id(id, "playlist id must be positive")?;
        if !self.playlists.try_insert(Playlist::new(id))? {
            return Err(CatalogError::PlaylistExists(id));
        }
        debug!(playlist = id, "added playlist");
        Ok(())
    }

    /// Deletes an empty playlist.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidInput`], [`CatalogError::NoSuchPlaylist`] or
    /// [`CatalogError::PlaylistNotEmpty`].
    pub fn delete_playlist(&mut self, id: PlaylistId) -> Result<(), CatalogError> {
        check_id(id, "playlist id must be positive")?;
        let playlist = self.playlist(id).ok_or(CatalogError::NoSuchPlaylist(id))?;
        if !playlist.is_empty() {
            return Err(CatalogError::PlaylistNotEmpty(id));
        }
        self.playlists.take_by(|playlist| playlist.id().cmp(&id));
        debug!(playlist = id, "deleted playlist");
        Ok(())
    }

    /// Adds a song with an initial play count.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidInput`] for a non-positive id or negative count,
    /// [`CatalogError::SongExists`], or [`CatalogError::Index`] if no room could be made
    /// for it.
    pub fn add_song(&mut self, id: SongId, plays: i32) -> Result<(), CatalogError> {
        check_id(id, "song id must be positive")?;
        check_plays(plays)?;
        if !self.songs.try_insert(Song::new(id, plays))? {
            return Err(CatalogError::SongExists(id));
        }
        debug!(song = id, plays, "added song");
        Ok(())
    }

    /// Deletes a song that no playlist references.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidInput`], [`CatalogError::NoSuchSong`] or
    /// [`CatalogError::SongInUse`].
    pub fn delete_song(&mut self, id: SongId) -> Result<(), CatalogError> {
        check_id(id, "song id must be positive")?;
        let song = self.song(id).ok_or(CatalogError::NoSuchSong(id))?;
        if song.is_in_any_playlist() {
            return Err(CatalogError::SongInUse(id));
        }
        self.songs.take_by(|song| song.id().cmp(&id));
        debug!(song = id, "deleted song");
        Ok(())
    }

    /// Adds a song to a playlist and records the membership on the song.
    ///
    /// Room for the membership is reserved first, so either both sides change or
    /// neither does.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidInput`], [`CatalogError::NoSuchSong`],
    /// [`CatalogError::NoSuchPlaylist`], [`CatalogError::AlreadyInPlaylist`], or
    /// [`CatalogError::Index`] on allocation failure.
    pub fn add_to_playlist(&mut self, playlist_id: PlaylistId, song_id: SongId) -> Result<(), CatalogError> {
        check_id(playlist_id, "playlist id must be positive")?;
        check_id(song_id, "song id must be positive")?;
        let Self { songs, playlists } = self;

        let song = song_in(songs, song_id)?;
        let playlist = playlist_in(playlists, playlist_id)?;

        song.memberships_mut().try_reserve(1)?;
        if !playlist.index_mut().insert(song_id, song.plays())? {
            return Err(CatalogError::AlreadyInPlaylist {
                playlist: playlist_id,
                song: song_id,
            });
        }
        song.memberships_mut().insert(playlist_id);
        debug!(playlist = playlist_id, song = song_id, "added song to playlist");
        Ok(())
    }

    /// Takes a song out of a playlist and drops the membership from the song.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidInput`], [`CatalogError::NoSuchSong`],
    /// [`CatalogError::NoSuchPlaylist`] or [`CatalogError::NotInPlaylist`].
    pub fn remove_from_playlist(&mut self, playlist_id: PlaylistId, song_id: SongId) -> Result<(), CatalogError> {
        check_id(playlist_id, "playlist id must be positive")?;
        check_id(song_id, "song id must be positive")?;
        let Self { songs, playlists } = self;

        let song = song_in(songs, song_id)?;
        let playlist = playlist_in(playlists, playlist_id)?;

        if playlist.index_mut().remove(song_id)?.is_none() {
            return Err(CatalogError::NotInPlaylist {
                playlist: playlist_id,
                song: song_id,
            });
        }
        song.memberships_mut().remove(&playlist_id);
        debug!(playlist = playlist_id, song = song_id, "removed song from playlist");
        Ok(())
    }

    /// Adds to a song's play count and re-ranks it in every playlist it belongs to.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidInput`] for a non-positive id or negative increment,
    /// [`CatalogError::NoSuchSong`], or [`CatalogError::PlaysOverflow`] with the count
    /// unchanged.
    pub fn add_plays(&mut self, song_id: SongId, additional: i32) -> Result<(), CatalogError> {
        check_id(song_id, "song id must be positive")?;
        check_plays(additional)?;
        let Self { songs, playlists } = self;

        let song = song_in(songs, song_id)?;
        let plays = song
            .plays()
            .checked_add(additional)
            .ok_or(CatalogError::PlaysOverflow(song_id))?;

        for playlist_id in song.playlists() {
            playlist_in(playlists, playlist_id)?.index_mut().update_rank(song_id, plays)?;
        }
        song.set_plays(plays);
        debug!(song = song_id, plays, "updated play count");
        Ok(())
    }

    /// # Errors
    ///
    /// [`CatalogError::InvalidInput`] or [`CatalogError::NoSuchSong`].
    pub fn get_plays(&self, song_id: SongId) -> Result<i32, CatalogError> {
        check_id(song_id, "song id must be positive")?;
        self.song(song_id).map(Song::plays).ok_or(CatalogError::NoSuchSong(song_id))
    }

    /// Id of the least-played song in the playlist with at least `plays` plays; lowest
    /// id on ties.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidInput`], [`CatalogError::NoSuchPlaylist`], or
    /// [`CatalogError::NoMatch`] when every song has fewer plays.
    pub fn get_by_plays(&self, playlist_id: PlaylistId, plays: i32) -> Result<SongId, CatalogError> {
        check_id(playlist_id, "playlist id must be positive")?;
        check_plays(plays)?;
        let playlist = self
            .playlist(playlist_id)
            .ok_or(CatalogError::NoSuchPlaylist(playlist_id))?;
        playlist
            .song_with_plays_at_least(plays)
            .ok_or(CatalogError::NoMatch {
                playlist: playlist_id,
                plays,
            })
    }

    /// # Errors
    ///
    /// [`CatalogError::InvalidInput`] or [`CatalogError::NoSuchPlaylist`].
    pub fn get_num_songs(&self, playlist_id: PlaylistId) -> Result<usize, CatalogError> {
        check_id(playlist_id, "playlist id must be positive")?;
        self.playlist(playlist_id)
            .map(Playlist::len)
            .ok_or(CatalogError::NoSuchPlaylist(playlist_id))
    }

    /// Merges playlist `source` into `target` and deletes `source`.
    ///
    /// All-or-nothing: on error both playlists and every song's memberships are as
    /// they were.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidInput`] for non-positive or equal ids,
    /// [`CatalogError::NoSuchPlaylist`] for either id, or [`CatalogError::Index`] if the
    /// merge could not reserve room.
    pub fn unite_playlists(&mut self, target: PlaylistId, source: PlaylistId) -> Result<(), CatalogError> {
        check_id(target, "playlist id must be positive")?;
        check_id(source, "playlist id must be positive")?;
        if target == source {
            return Err(CatalogError::InvalidInput("cannot unite a playlist with itself"));
        }
        let mut absorbed = self
            .playlists
            .take_by(|playlist| playlist.id().cmp(&source))
            .ok_or(CatalogError::NoSuchPlaylist(source))?;

        let Self { songs, playlists } = self;
        let playlist = match playlist_in(playlists, target) {
            Ok(playlist) => playlist,
            Err(err) => {
                playlists.insert(absorbed);
                return Err(err);
            }
        };
        let mut ledger = Transfer {
            songs,
            from: source,
            to: target,
        };

        match playlist.index_mut().merge_from(absorbed.index_mut(), &mut ledger) {
            Ok(summary) => {
                debug!(into = target, from = source, moved = summary.moved, duplicates = summary.duplicates, "united playlists");
                Ok(())
            }
            Err(err) => {
                // Reuses the node freed by taking the source out.
                playlists.insert(absorbed);
                Err(err.into())
            }
        }
    }

    /// Confirms that every playlist's two indexes agree, that each indexed song records
    /// the playlist in its membership set at its current play count, and that no song
    /// claims a playlist that does not list it.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Index`] if a playlist's indexes disagree,
    /// [`CatalogError::NoSuchSong`] for an indexed song that does not exist, or
    /// [`CatalogError::NotInPlaylist`] for a one-sided or stale membership.
    pub fn check_consistency(&self) -> Result<(), CatalogError> {
        for playlist in self.playlists.iter() {
            let index: &DualIndex<SongId, i32> = playlist.index();
            index.check_consistency()?;
            for entry in index.iter_by_id() {
                let song = self.song(entry.id).ok_or(CatalogError::NoSuchSong(entry.id))?;
                if !song.is_in_playlist(playlist.id()) || song.plays() != entry.rank {
                    return Err(CatalogError::NotInPlaylist {
                        playlist: playlist.id(),
                        song: entry.id,
                    });
                }
            }
        }
        for song in self.songs.iter() {
            for playlist_id in song.playlists() {
                let listed = self.playlist(playlist_id).is_some_and(|playlist| playlist.contains(song.id()));
                if !listed {
                    return Err(CatalogError::NotInPlaylist {
                        playlist: playlist_id,
                        song: song.id(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Moves song memberships from one playlist to another during a merge.
struct Transfer<'a> {
    songs: &'a mut AvlTree<Song, BySongId>,
    from: PlaylistId,
    to: PlaylistId,
}

impl Transfer<'_> {
    fn song_mut(&mut self, id: SongId) -> Option<&mut Song> {
        self.songs.get_mut_by(|song| song.id().cmp(&id))
    }
}

impl MembershipLedger<SongId> for Transfer<'_> {
    fn reserve(&mut self, entity: SongId) -> Result<(), IndexError> {
        match self.song_mut(entity) {
            Some(song) => song.memberships_mut().try_reserve(1),
            None => Ok(()),
        }
    }

    fn joined(&mut self, entity: SongId) {
        let to = self.to;
        if let Some(song) = self.song_mut(entity) {
            song.memberships_mut().insert(to);
        }
    }

    fn left(&mut self, entity: SongId) {
        let from = self.from;
        if let Some(song) = self.song_mut(entity) {
            song.memberships_mut().remove(&from);
        }
    }
}
