//! Async card database with lazy and eager loading
//!
//! Supports two loading modes:
//! 1. Lazy loading: load cards on demand when requested (parallel I/O)
//! 2. Eager loading: load all cards upfront from the cardsfolder

use crate::loader::card::{CardDefinition, CardLoader};
use crate::loader::DeckList;
use crate::{PocketError, Result};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Convert a card name to its file path
///
/// "Mr. Mime" -> "cardsfolder/m/mr_mime.txt"
/// "Farfetch'd" -> "cardsfolder/f/farfetchd.txt"
pub fn card_name_to_path(cardsfolder: &Path, card_name: &str) -> PathBuf {
    let normalized: String = card_name
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' => Some('_'),
            '\'' | ',' | ':' | '!' | '?' | '.' => None,
            'é' => Some('e'),
            _ => Some(c),
        })
        .collect();

    let first_char = normalized.chars().next().unwrap_or('_');

    cardsfolder
        .join(first_char.to_string())
        .join(format!("{normalized}.txt"))
}

/// Card database keyed by lower-cased card name
///
/// The cache is shared between handles, so tasks spawned for parallel loading
/// all fill the same map.
pub struct CardDatabase {
    /// Base directory containing card files
    cardsfolder: PathBuf,
    cards: Arc<RwLock<FxHashMap<String, Arc<CardDefinition>>>>,
}

impl CardDatabase {
    pub fn new(cardsfolder: PathBuf) -> Self {
        CardDatabase {
            cardsfolder,
            cards: Arc::new(RwLock::new(FxHashMap::default())),
        }
    }

    pub fn cardsfolder(&self) -> &Path {
        &self.cardsfolder
    }

    /// Insert a definition directly (used for generated cards and tests)
    pub async fn add_card(&self, card: CardDefinition) {
        let key = card.name.to_lowercase();
        self.cards.write().await.insert(key, Arc::new(card));
    }

    /// Load a single card by name, with caching
    ///
    /// `Ok(None)` when no card file exists; a file that fails to parse is an
    /// error.
    pub async fn get_card(&self, name: &str) -> Result<Option<Arc<CardDefinition>>> {
        let key = name.to_lowercase();
        if let Some(card) = self.cards.read().await.get(&key) {
            return Ok(Some(Arc::clone(card)));
        }

        let path = card_name_to_path(&self.cardsfolder, name);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }

        let card = Arc::new(Self::load_card_async(path).await?);
        self.cards.write().await.insert(key, Arc::clone(&card));
        Ok(Some(card))
    }

    /// Load several cards in parallel, failing on the first missing card
    ///
    /// Returns the number loaded and the elapsed time.
    pub async fn load_cards(&self, names: &[String]) -> Result<(usize, Duration)> {
        let start = Instant::now();

        let tasks: Vec<_> = names
            .iter()
            .map(|name| {
                let db = self.clone_handle();
                let name = name.clone();
                (name.clone(), tokio::spawn(async move { db.get_card(&name).await }))
            })
            .collect();

        let mut loaded = 0;
        for (card_name, task) in tasks {
            match task.await? {
                Ok(Some(_)) => loaded += 1,
                Ok(None) => {
                    return Err(PocketError::InvalidCardFormat(format!(
                        "Card file not found: '{}' (expected path: {})",
                        card_name,
                        card_name_to_path(&self.cardsfolder, &card_name).display()
                    )))
                }
                Err(e) => return Err(e),
            }
        }

        Ok((loaded, start.elapsed()))
    }

    /// Load every card a deck needs ahead of time
    pub async fn prefetch_deck(&self, deck: &DeckList) -> Result<(usize, Duration)> {
        self.load_cards(&deck.unique_names()).await
    }

    /// Eagerly load every card file under the cardsfolder
    ///
    /// The directory walk runs on a blocking thread (jwalk walks in parallel)
    /// and parsing starts as soon as paths are discovered.
    pub async fn eager_load(&self) -> Result<(usize, Duration)> {
        let start = Instant::now();
        let cardsfolder = self.cardsfolder.clone();

        let (path_tx, mut path_rx) = tokio::sync::mpsc::unbounded_channel();
        let walker = tokio::task::spawn_blocking(move || -> Result<()> {
            for entry in jwalk::WalkDir::new(&cardsfolder).skip_hidden(true) {
                let entry = entry.map_err(|e| PocketError::IoError(std::io::Error::other(e.to_string())))?;
                let path = entry.path();
                if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "txt") {
                    if path_tx.send(path).is_err() {
                        break;
                    }
                }
            }
            Ok(())
        });

        let mut loads = Vec::new();
        while let Some(path) = path_rx.recv().await {
            loads.push(tokio::spawn(Self::load_card_async(path)));
        }
        walker.await??;

        let mut cards = FxHashMap::default();
        for load in loads {
            let card = load.await??;
            cards.insert(card.name.to_lowercase(), Arc::new(card));
        }

        let loaded = cards.len();
        *self.cards.write().await = cards;
        Ok((loaded, start.elapsed()))
    }

    async fn load_card_async(path: PathBuf) -> Result<CardDefinition> {
        let contents = tokio::fs::read_to_string(&path).await?;
        CardLoader::parse(&contents).map_err(|e| {
            PocketError::InvalidCardFormat(format!("Failed to parse card file '{}': {}", path.display(), e))
        })
    }

    /// Another handle onto the same cache
    pub fn clone_handle(&self) -> Self {
        CardDatabase {
            cardsfolder: self.cardsfolder.clone(),
            cards: Arc::clone(&self.cards),
        }
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.cards.read().await.contains_key(&name.to_lowercase())
    }

    pub async fn len(&self) -> usize {
        self.cards.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cards.read().await.is_empty()
    }
}
