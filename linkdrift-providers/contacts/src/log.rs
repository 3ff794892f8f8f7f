//! In-memory contact logs.

use std::{
    collections::{BTreeMap, btree_map::Entry},
    io::BufRead,
};

use linkdrift_core::{NodeId, Partition};
use tracing::{debug, info, instrument};

use crate::{errors::ContactLogError, ingest::parse_line, source::ContactWindow};

/// One timestamped contact between two people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEvent {
    /// Timestamp as recorded in the log.
    pub time: u64,
    /// Lower-numbered participant.
    pub source: NodeId,
    /// Higher-numbered participant.
    pub target: NodeId,
    /// Class label of `source`.
    pub source_class: String,
    /// Class label of `target`.
    pub target_class: String,
}

/// Ordered contact events with `source < target`, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactLog {
    name: String,
    events: Vec<ContactEvent>,
    discarded: usize,
}

impl ContactLog {
    /// Builds a log from already-parsed events.
    ///
    /// Events whose `source` is not strictly below `target` are discarded,
    /// which also removes self-loops and mirrored duplicates.
    ///
    /// # Errors
    /// Returns [`ContactLogError::EmptyInput`] when no event survives.
    ///
    /// # Examples
    /// ```
    /// use linkdrift_core::NodeId;
    /// use linkdrift_providers_contacts::{ContactEvent, ContactLog};
    ///
    /// let event = |time, source, target| ContactEvent {
    ///     time,
    ///     source: NodeId::new(source),
    ///     target: NodeId::new(target),
    ///     source_class: "1A".into(),
    ///     target_class: "1A".into(),
    /// };
    /// let log = ContactLog::new("demo", vec![event(0, 1, 2), event(20, 2, 1)])?;
    /// assert_eq!(log.len(), 1);
    /// assert_eq!(log.discarded(), 1);
    /// # Ok::<(), linkdrift_providers_contacts::ContactLogError>(())
    /// ```
    pub fn new(
        name: impl Into<String>,
        events: impl IntoIterator<Item = ContactEvent>,
    ) -> Result<Self, ContactLogError> {
        let mut discarded = 0;
        let events: Vec<ContactEvent> = events
            .into_iter()
            .filter(|event| {
                let keep = event.source < event.target;
                if !keep {
                    discarded += 1;
                }
                keep
            })
            .collect();
        if events.is_empty() {
            return Err(ContactLogError::EmptyInput);
        }
        Ok(Self {
            name: name.into(),
            events,
            discarded,
        })
    }

    /// Reads a tab-separated log of `time, source, target, class1, class2`
    /// records.
    ///
    /// Blank lines are skipped and every field is trimmed.
    ///
    /// # Errors
    /// Returns [`ContactLogError::Io`] when reading fails,
    /// [`ContactLogError::MissingField`] or [`ContactLogError::InvalidField`]
    /// for malformed records, and [`ContactLogError::EmptyInput`] when no
    /// record survives filtering.
    ///
    /// # Examples
    /// ```
    /// use std::io::Cursor;
    /// use linkdrift_providers_contacts::ContactLog;
    ///
    /// let raw = "0\t1\t2\t1A\t1A\n20\t3\t3\t1B\t1B\n\n40\t2\t3\t1A\t1B\n";
    /// let log = ContactLog::try_from_reader("demo", Cursor::new(raw))?;
    /// assert_eq!(log.len(), 2);
    /// assert_eq!(log.discarded(), 1);
    /// # Ok::<(), linkdrift_providers_contacts::ContactLogError>(())
    /// ```
    #[instrument(name = "contacts.read", err, skip_all, fields(name = %name.as_ref()))]
    pub fn try_from_reader<R: BufRead>(
        name: impl AsRef<str>,
        reader: R,
    ) -> Result<Self, ContactLogError> {
        let mut events = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if let Some(event) = parse_line(index + 1, &line)? {
                events.push(event);
            }
        }
        let log = Self::new(name.as_ref(), events)?;
        info!(
            events = log.len(),
            discarded = log.discarded,
            "contact log read"
        );
        Ok(log)
    }

    /// Returns the log name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the retained events in file order.
    #[must_use]
    pub fn events(&self) -> &[ContactEvent] {
        &self.events
    }

    /// Returns the number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns whether the log holds no events. Always `false` for a
    /// successfully built log.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the number of events dropped for not having `source < target`.
    #[must_use]
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Splits the log into the first `offset` events and the rest.
    ///
    /// `offset` is clamped to the log length, so an oversized offset yields
    /// an empty suffix.
    ///
    /// # Examples
    /// ```
    /// use std::io::Cursor;
    /// use linkdrift_core::EdgeSource;
    /// use linkdrift_providers_contacts::ContactLog;
    ///
    /// let raw = "0\t1\t2\tA\tA\n20\t2\t3\tA\tB\n40\t1\t3\tA\tB\n";
    /// let log = ContactLog::try_from_reader("demo", Cursor::new(raw))?;
    /// let (training, test) = log.split_at(2);
    /// assert_eq!(training.len(), 2);
    /// assert_eq!(test.len(), 1);
    /// assert_eq!(training.name(), "demo[..2]");
    /// assert_eq!(test.name(), "demo[2..]");
    /// assert!(log.split_at(10).1.is_empty());
    /// # Ok::<(), linkdrift_providers_contacts::ContactLogError>(())
    /// ```
    #[must_use]
    pub fn split_at(&self, offset: usize) -> (ContactWindow<'_>, ContactWindow<'_>) {
        let offset = offset.min(self.events.len());
        let (prefix, suffix) = self.events.split_at(offset);
        debug!(
            offset,
            training = prefix.len(),
            test = suffix.len(),
            "contact log split"
        );
        (
            ContactWindow::new(format!("{}[..{offset}]", self.name), prefix),
            ContactWindow::new(format!("{}[{offset}..]", self.name), suffix),
        )
    }

    /// Labels every participant with the first class it was observed with.
    ///
    /// # Examples
    /// ```
    /// use std::io::Cursor;
    /// use linkdrift_core::NodeId;
    /// use linkdrift_providers_contacts::ContactLog;
    ///
    /// let raw = "0\t1\t2\t1A\t1B\n20\t1\t3\t2A\t1B\n";
    /// let log = ContactLog::try_from_reader("demo", Cursor::new(raw))?;
    /// let partition = log.class_partition();
    /// assert_eq!(partition.len(), 3);
    /// assert_eq!(partition.community_count(), 2);
    /// assert_eq!(
    ///     partition.community_of(NodeId::new(2)),
    ///     partition.community_of(NodeId::new(3)),
    /// );
    /// # Ok::<(), linkdrift_providers_contacts::ContactLogError>(())
    /// ```
    #[must_use]
    pub fn class_partition(&self) -> Partition {
        let mut classes: BTreeMap<NodeId, &str> = BTreeMap::new();
        for event in &self.events {
            for (node, class) in [
                (event.source, event.source_class.as_str()),
                (event.target, event.target_class.as_str()),
            ] {
                if let Entry::Vacant(slot) = classes.entry(node) {
                    slot.insert(class);
                }
            }
        }
        Partition::from_labels(classes)
    }
}
