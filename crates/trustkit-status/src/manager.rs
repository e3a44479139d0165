//! # Status-List Manager
//!
//! Owns every status list and its two index maps. Lists live in a
//! [`DashMap`] of `Arc<Mutex<_>>`: the map shard lock is only held long
//! enough to clone the `Arc`, and all list work happens under that list's
//! own mutex.
//!
//! ## Index allocation
//!
//! Automatic assignment hands out the lowest free index at or above the
//! list's cursor and then moves the cursor past it. Indices below the
//! cursor are never handed out again automatically, even if they were
//! skipped by an explicit assignment. When nothing is free above the
//! cursor the list is exhausted until it is expanded.
//!
//! ## Single versus batch calls
//!
//! Single-credential flag calls (`revoke`, `suspend`, ...) report success
//! as a `bool` and log why they were rejected. Batch calls return a typed
//! [`StatusListError`] and mutate nothing when they fail.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use trustkit_core::TrustConfig;
use trustkit_vc::{CredentialStatus, StatusPurpose, VerifiableCredential};

use crate::bitstring::BitString;
use crate::error::StatusListError;
use crate::list::{StatusCheck, StatusList, StatusListSnapshot, StatusStatistics, StatusUpdate};
use crate::STATUS_ENTRY_TYPE;

#[derive(Debug)]
struct ListState {
    id: String,
    issuer: String,
    purpose: StatusPurpose,
    bits: BitString,
    encoded: String,
    by_credential: HashMap<String, usize>,
    by_index: HashMap<usize, String>,
    cursor: usize,
}

impl ListState {
    fn new(id: String, issuer: String, purpose: StatusPurpose, bits: BitString) -> Self {
        let encoded = bits.encode();
        Self {
            id,
            issuer,
            purpose,
            bits,
            encoded,
            by_credential: HashMap::new(),
            by_index: HashMap::new(),
            cursor: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.bits.len()
    }

    fn view(&self) -> StatusList {
        StatusList {
            id: self.id.clone(),
            issuer: self.issuer.clone(),
            purpose: self.purpose,
            capacity: self.capacity(),
            encoded_list: self.encoded.clone(),
        }
    }

    fn reencode(&mut self) {
        self.encoded = self.bits.encode();
    }

    fn ensure_purpose(&self, requested: StatusPurpose) -> Result<(), StatusListError> {
        if self.purpose == requested {
            Ok(())
        } else {
            Err(StatusListError::PurposeMismatch {
                list_id: self.id.clone(),
                requested,
                actual: self.purpose,
            })
        }
    }

    fn assign(&mut self, credential_id: &str, requested: Option<usize>) -> Result<usize, StatusListError> {
        if let Some(&existing) = self.by_credential.get(credential_id) {
            return match requested {
                Some(index) if index != existing => Err(StatusListError::CredentialAlreadyIndexed {
                    credential_id: credential_id.to_string(),
                    index: existing,
                }),
                _ => Ok(existing),
            };
        }

        let index = match requested {
            Some(index) => {
                if index >= self.capacity() {
                    return Err(StatusListError::IndexOutOfRange {
                        index,
                        capacity: self.capacity(),
                    });
                }
                if let Some(holder) = self.by_index.get(&index) {
                    return Err(StatusListError::IndexAlreadyAssigned {
                        list_id: self.id.clone(),
                        index,
                        credential_id: holder.clone(),
                    });
                }
                index
            }
            None => {
                let free = (self.cursor..self.capacity())
                    .find(|i| !self.by_index.contains_key(i))
                    .ok_or_else(|| StatusListError::CapacityExhausted {
                        list_id: self.id.clone(),
                        capacity: self.capacity(),
                    })?;
                self.cursor = free + 1;
                free
            }
        };

        self.by_credential.insert(credential_id.to_string(), index);
        self.by_index.insert(index, credential_id.to_string());
        Ok(index)
    }

    fn free_above_cursor(&self) -> usize {
        (self.cursor..self.capacity())
            .filter(|i| !self.by_index.contains_key(i))
            .count()
    }

    fn check(&self, index: usize) -> Result<StatusCheck, StatusListError> {
        let flag = self.bits.get(index).ok_or(StatusListError::IndexOutOfRange {
            index,
            capacity: self.capacity(),
        })?;
        Ok(StatusCheck::for_purpose(self.purpose, flag))
    }
}

/// Registry of status lists.
#[derive(Debug)]
pub struct StatusListManager {
    lists: DashMap<String, Arc<Mutex<ListState>>>,
    default_capacity: usize,
}

impl Default for StatusListManager {
    fn default() -> Self {
        Self::from_config(&TrustConfig::default())
    }
}

impl StatusListManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager whose [`create_default`](Self::create_default) lists have
    /// `capacity` bits.
    pub fn with_default_capacity(capacity: usize) -> Self {
        Self {
            lists: DashMap::new(),
            default_capacity: capacity,
        }
    }

    pub fn from_config(config: &TrustConfig) -> Self {
        Self::with_default_capacity(config.default_status_list_capacity)
    }

    fn list(&self, list_id: &str) -> Result<Arc<Mutex<ListState>>, StatusListError> {
        self.lists
            .get(list_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| StatusListError::ListNotFound(list_id.to_string()))
    }

    fn insert(&self, state: ListState) -> Result<StatusList, StatusListError> {
        match self.lists.entry(state.id.clone()) {
            Entry::Occupied(_) => Err(StatusListError::ListAlreadyExists(state.id)),
            Entry::Vacant(slot) => {
                let view = state.view();
                slot.insert(Arc::new(Mutex::new(state)));
                tracing::debug!(list_id = %view.id, purpose = %view.purpose, capacity = view.capacity, "status list created");
                Ok(view)
            }
        }
    }

    /// Create a zero-filled list. `id` defaults to a fresh UUID.
    ///
    /// # Errors
    ///
    /// [`StatusListError::InvalidCapacity`] for a zero capacity,
    /// [`StatusListError::ListAlreadyExists`] if `id` is taken.
    pub fn create_list(
        &self,
        issuer: impl Into<String>,
        purpose: StatusPurpose,
        capacity: usize,
        id: Option<String>,
    ) -> Result<StatusList, StatusListError> {
        if capacity == 0 {
            return Err(StatusListError::InvalidCapacity(
                "a status list needs at least one bit".to_string(),
            ));
        }
        let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        self.insert(ListState::new(id, issuer.into(), purpose, BitString::new(capacity)))
    }

    /// Create a list with the configured default capacity and a fresh id.
    pub fn create_default(
        &self,
        issuer: impl Into<String>,
        purpose: StatusPurpose,
    ) -> Result<StatusList, StatusListError> {
        self.create_list(issuer, purpose, self.default_capacity, None)
    }

    pub fn get_list(&self, list_id: &str) -> Result<StatusList, StatusListError> {
        Ok(self.list(list_id)?.lock().view())
    }

    /// Remove a list and its index maps. Returns false if it did not exist.
    pub fn delete_list(&self, list_id: &str) -> bool {
        let removed = self.lists.remove(list_id).is_some();
        if removed {
            tracing::debug!(list_id, "status list deleted");
        }
        removed
    }

    /// Ids of every list, sorted.
    pub fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lists.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Lists owned by `issuer`, sorted by id.
    pub fn lists_for_issuer(&self, issuer: &str) -> Vec<StatusList> {
        let handles: Vec<_> = self.lists.iter().map(|e| Arc::clone(e.value())).collect();
        let mut lists: Vec<StatusList> = handles
            .iter()
            .filter_map(|handle| {
                let state = handle.lock();
                (state.issuer == issuer).then(|| state.view())
            })
            .collect();
        lists.sort_by(|a, b| a.id.cmp(&b.id));
        lists
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Give `credential_id` an index in `list_id`.
    ///
    /// Assigning a credential that already holds an index returns that
    /// index, unless a different explicit `index` was requested.
    pub fn assign_index(
        &self,
        credential_id: &str,
        list_id: &str,
        index: Option<usize>,
    ) -> Result<usize, StatusListError> {
        let list = self.list(list_id)?;
        let mut state = list.lock();
        state.assign(credential_id, index)
    }

    /// The index `credential_id` holds in `list_id`, if any.
    pub fn index_of(&self, list_id: &str, credential_id: &str) -> Result<Option<usize>, StatusListError> {
        Ok(self.list(list_id)?.lock().by_credential.get(credential_id).copied())
    }

    /// Set or clear the `purpose` flag of a credential, assigning it an
    /// index first if it has none. Returns false if the list does not
    /// exist, tracks the other purpose, or has no index left.
    pub fn set_flag(&self, credential_id: &str, list_id: &str, purpose: StatusPurpose, on: bool) -> bool {
        match self.try_set_flag(credential_id, list_id, purpose, on) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(list_id, credential_id, error = %e, "status flag update rejected");
                false
            }
        }
    }

    fn try_set_flag(
        &self,
        credential_id: &str,
        list_id: &str,
        purpose: StatusPurpose,
        on: bool,
    ) -> Result<(), StatusListError> {
        let list = self.list(list_id)?;
        let mut state = list.lock();
        state.ensure_purpose(purpose)?;
        let existing = state.by_credential.get(credential_id).copied();
        let index = match existing {
            Some(index) => index,
            // Clearing a flag that was never set needs no index.
            None if !on => return Ok(()),
            None => state.assign(credential_id, None)?,
        };
        state.bits.set(index, on)?;
        state.reencode();
        Ok(())
    }

    pub fn revoke(&self, credential_id: &str, list_id: &str) -> bool {
        self.set_flag(credential_id, list_id, StatusPurpose::Revocation, true)
    }

    pub fn unrevoke(&self, credential_id: &str, list_id: &str) -> bool {
        self.set_flag(credential_id, list_id, StatusPurpose::Revocation, false)
    }

    pub fn suspend(&self, credential_id: &str, list_id: &str) -> bool {
        self.set_flag(credential_id, list_id, StatusPurpose::Suspension, true)
    }

    pub fn unsuspend(&self, credential_id: &str, list_id: &str) -> bool {
        self.set_flag(credential_id, list_id, StatusPurpose::Suspension, false)
    }

    /// Set or clear the flag of many credentials with one re-encode.
    /// Returns how many bits changed.
    ///
    /// # Errors
    ///
    /// Fails without mutating the list if it does not exist, tracks the
    /// other purpose, or cannot index every new credential.
    pub fn set_flags<S: AsRef<str>>(
        &self,
        list_id: &str,
        purpose: StatusPurpose,
        credential_ids: &[S],
        on: bool,
    ) -> Result<usize, StatusListError> {
        let list = self.list(list_id)?;
        let mut state = list.lock();
        state.ensure_purpose(purpose)?;

        if on {
            let new: HashSet<&str> = credential_ids
                .iter()
                .map(AsRef::as_ref)
                .filter(|id| !state.by_credential.contains_key(*id))
                .collect();
            if new.len() > state.free_above_cursor() {
                return Err(StatusListError::CapacityExhausted {
                    list_id: list_id.to_string(),
                    capacity: state.capacity(),
                });
            }
        }

        let mut changed = 0;
        for id in credential_ids.iter().map(AsRef::as_ref) {
            let existing = state.by_credential.get(id).copied();
            let index = match existing {
                Some(index) => index,
                None if !on => continue,
                None => state.assign(id, None)?,
            };
            if state.bits.set(index, on)? != on {
                changed += 1;
            }
        }
        state.reencode();
        tracing::debug!(list_id, %purpose, on, requested = credential_ids.len(), changed, "batch status update");
        Ok(changed)
    }

    /// Apply index-level updates with one re-encode. Returns how many bits
    /// changed.
    ///
    /// # Errors
    ///
    /// Fails without mutating the list if any index is out of range or an
    /// update sets the flag of the purpose the list does not track.
    pub fn apply_updates(&self, list_id: &str, updates: &[StatusUpdate]) -> Result<usize, StatusListError> {
        let list = self.list(list_id)?;
        let mut state = list.lock();

        for update in updates {
            if update.index >= state.capacity() {
                return Err(StatusListError::IndexOutOfRange {
                    index: update.index,
                    capacity: state.capacity(),
                });
            }
            let (_, other_given) = update.split(state.purpose);
            if other_given {
                let requested = match state.purpose {
                    StatusPurpose::Revocation => StatusPurpose::Suspension,
                    StatusPurpose::Suspension => StatusPurpose::Revocation,
                };
                state.ensure_purpose(requested)?;
            }
        }

        let mut changed = 0;
        for update in updates {
            if let (Some(on), _) = update.split(state.purpose) {
                if state.bits.set(update.index, on)? != on {
                    changed += 1;
                }
            }
        }
        state.reencode();
        Ok(changed)
    }

    /// Flags at one index.
    pub fn check_status(&self, list_id: &str, index: usize) -> Result<StatusCheck, StatusListError> {
        self.list(list_id)?.lock().check(index)
    }

    /// Flags of a credential by its assignment in `list_id`. A credential
    /// without an index is reported clear.
    pub fn check_assigned(&self, list_id: &str, credential_id: &str) -> Result<StatusCheck, StatusListError> {
        let list = self.list(list_id)?;
        let state = list.lock();
        match state.by_credential.get(credential_id) {
            Some(&index) => state.check(index),
            None => Ok(StatusCheck::default()),
        }
    }

    /// Flags of a credential across all of its `credentialStatus` entries.
    ///
    /// Each entry's `statusListIndex` is used when present; otherwise the
    /// credential's `id` is looked up in the list's assignments.
    pub fn check_credential(&self, credential: &VerifiableCredential) -> Result<StatusCheck, StatusListError> {
        self.check_credential_as(credential, None)
    }

    /// Like [`check_credential`](Self::check_credential), but an id-less
    /// credential is looked up under `fallback_identity`.
    pub fn check_credential_as(
        &self,
        credential: &VerifiableCredential,
        fallback_identity: Option<&str>,
    ) -> Result<StatusCheck, StatusListError> {
        let identity = match fallback_identity {
            Some(fallback) => Some(credential.status_identity(fallback)),
            None => credential.id.clone(),
        };
        let mut result = StatusCheck::default();
        for entry in credential.credential_status.as_list() {
            result = result.merge(self.check_entry(entry, identity.as_deref())?);
        }
        Ok(result)
    }

    fn check_entry(
        &self,
        entry: &CredentialStatus,
        credential_id: Option<&str>,
    ) -> Result<StatusCheck, StatusListError> {
        let list = self.list(&entry.status_list_credential)?;
        let state = list.lock();
        state.ensure_purpose(entry.status_purpose)?;
        let index = entry
            .status_list_index
            .or_else(|| credential_id.and_then(|id| state.by_credential.get(id).copied()));
        match index {
            Some(index) => state.check(index),
            None => Ok(StatusCheck::default()),
        }
    }

    /// Grow a list by `additional_bits`. Existing bits and assignments are
    /// untouched.
    pub fn expand(&self, list_id: &str, additional_bits: usize) -> Result<StatusList, StatusListError> {
        let list = self.list(list_id)?;
        let mut state = list.lock();
        state.capacity().checked_add(additional_bits).ok_or_else(|| {
            StatusListError::InvalidCapacity(format!("cannot add {additional_bits} bits"))
        })?;
        state.bits.grow(additional_bits);
        state.reencode();
        tracing::debug!(list_id, capacity = state.capacity(), "status list expanded");
        Ok(state.view())
    }

    /// Counts for one list. `available_indices` is what automatic
    /// assignment can still hand out, so free slots below the cursor are
    /// not included.
    pub fn statistics(&self, list_id: &str) -> Result<StatusStatistics, StatusListError> {
        let list = self.list(list_id)?;
        let state = list.lock();
        let flagged = state.bits.count_ones();
        let used = state.by_credential.len();
        let (revoked_count, suspended_count) = match state.purpose {
            StatusPurpose::Revocation => (flagged, 0),
            StatusPurpose::Suspension => (0, flagged),
        };
        Ok(StatusStatistics {
            capacity: state.capacity(),
            used_indices: used,
            revoked_count,
            suspended_count,
            available_indices: state.free_above_cursor(),
        })
    }

    /// The `credentialStatus` entry for `credential_id`, assigning an index
    /// if needed. Embed it before signing so the proof covers it.
    pub fn status_entry(&self, list_id: &str, credential_id: &str) -> Result<CredentialStatus, StatusListError> {
        let list = self.list(list_id)?;
        let mut state = list.lock();
        let index = state.assign(credential_id, None)?;
        Ok(CredentialStatus {
            id: format!("{list_id}#{index}"),
            status_type: STATUS_ENTRY_TYPE.to_string(),
            status_purpose: state.purpose,
            status_list_index: Some(index),
            status_list_credential: list_id.to_string(),
        })
    }

    pub fn export_list(&self, list_id: &str) -> Result<StatusListSnapshot, StatusListError> {
        let list = self.list(list_id)?;
        let state = list.lock();
        Ok(StatusListSnapshot {
            list: state.view(),
            cursor: state.cursor,
            assignments: state
                .by_credential
                .iter()
                .map(|(id, index)| (id.clone(), *index))
                .collect(),
        })
    }

    /// Rebuild a list from a snapshot.
    ///
    /// # Errors
    ///
    /// Rejects snapshots whose encoding does not match their capacity or
    /// whose assignments are out of range or collide.
    pub fn import_list(&self, snapshot: StatusListSnapshot) -> Result<StatusList, StatusListError> {
        let StatusListSnapshot {
            list,
            cursor,
            assignments,
        } = snapshot;
        if list.capacity == 0 {
            return Err(StatusListError::InvalidCapacity(
                "a status list needs at least one bit".to_string(),
            ));
        }
        if cursor > list.capacity {
            return Err(StatusListError::InvalidCapacity(format!(
                "cursor {cursor} is past capacity {}",
                list.capacity
            )));
        }
        let bits = BitString::decode(&list.encoded_list, list.capacity)?;
        let mut state = ListState::new(list.id, list.issuer, list.purpose, bits);
        for (credential_id, index) in assignments {
            state.assign(&credential_id, Some(index))?;
        }
        state.cursor = cursor;
        self.insert(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with_list(capacity: usize) -> (StatusListManager, String) {
        let manager = StatusListManager::new();
        let list = manager
            .create_list("did:example:issuer", StatusPurpose::Revocation, capacity, None)
            .unwrap();
        (manager, list.id)
    }

    #[test]
    fn revoke_then_unrevoke_round_trips() {
        let (manager, list) = manager_with_list(8);
        assert_eq!(manager.assign_index("c1", &list, None).unwrap(), 0);
        assert!(manager.revoke("c1", &list));
        assert!(manager.check_assigned(&list, "c1").unwrap().revoked);
        assert!(manager.unrevoke("c1", &list));
        assert!(manager.check_assigned(&list, "c1").unwrap().is_clear());
    }

    #[test]
    fn encoded_list_tracks_flags() {
        let (manager, list) = manager_with_list(16);
        assert_eq!(manager.get_list(&list).unwrap().encoded_list, "AAA=");
        manager.assign_index("a", &list, Some(9)).unwrap();
        manager.revoke("a", &list);
        assert_eq!(manager.get_list(&list).unwrap().encoded_list, "AEA=");
    }

    #[test]
    fn create_list_validates() {
        let manager = StatusListManager::new();
        assert!(matches!(
            manager.create_list("i", StatusPurpose::Revocation, 0, None),
            Err(StatusListError::InvalidCapacity(_))
        ));
        manager
            .create_list("i", StatusPurpose::Revocation, 8, Some("fixed".into()))
            .unwrap();
        assert_eq!(
            manager.create_list("i", StatusPurpose::Suspension, 8, Some("fixed".into())),
            Err(StatusListError::ListAlreadyExists("fixed".into()))
        );
    }

    #[test]
    fn generated_ids_are_unique() {
        let manager = StatusListManager::with_default_capacity(64);
        let a = manager.create_default("i", StatusPurpose::Revocation).unwrap();
        let b = manager.create_default("i", StatusPurpose::Revocation).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.capacity, 64);
    }

    #[test]
    fn explicit_index_conflicts() {
        let (manager, list) = manager_with_list(8);
        manager.assign_index("c1", &list, Some(3)).unwrap();
        assert_eq!(
            manager.assign_index("c2", &list, Some(3)),
            Err(StatusListError::IndexAlreadyAssigned {
                list_id: list.clone(),
                index: 3,
                credential_id: "c1".into()
            })
        );
        assert_eq!(
            manager.assign_index("c1", &list, Some(4)),
            Err(StatusListError::CredentialAlreadyIndexed {
                credential_id: "c1".into(),
                index: 3
            })
        );
        assert_eq!(manager.assign_index("c1", &list, None).unwrap(), 3);
        assert_eq!(
            manager.assign_index("c3", &list, Some(8)),
            Err(StatusListError::IndexOutOfRange { index: 8, capacity: 8 })
        );
    }

    #[test]
    fn automatic_assignment_skips_taken_indices_and_never_goes_back() {
        let (manager, list) = manager_with_list(4);
        manager.assign_index("x", &list, Some(1)).unwrap();
        assert_eq!(manager.assign_index("a", &list, None).unwrap(), 0);
        assert_eq!(manager.assign_index("b", &list, None).unwrap(), 2);
        manager.revoke("a", &list);
        manager.unrevoke("a", &list);
        assert_eq!(manager.assign_index("c", &list, None).unwrap(), 3);
        assert!(matches!(
            manager.assign_index("d", &list, None),
            Err(StatusListError::CapacityExhausted { .. })
        ));
        manager.expand(&list, 4).unwrap();
        assert_eq!(manager.assign_index("d", &list, None).unwrap(), 4);
    }

    #[test]
    fn purpose_mismatch_is_false_for_single_calls() {
        let (manager, list) = manager_with_list(8);
        assert!(!manager.suspend("c1", &list));
        assert_eq!(manager.index_of(&list, "c1").unwrap(), None);
        assert!(!manager.revoke("c1", "no-such-list"));
    }

    #[test]
    fn unrevoking_unknown_credential_assigns_nothing() {
        let (manager, list) = manager_with_list(8);
        assert!(manager.unrevoke("ghost", &list));
        assert_eq!(manager.statistics(&list).unwrap().used_indices, 0);
    }

    #[test]
    fn suspension_lists_report_suspended() {
        let manager = StatusListManager::new();
        let list = manager
            .create_list("i", StatusPurpose::Suspension, 8, None)
            .unwrap()
            .id;
        assert!(manager.suspend("c1", &list));
        let check = manager.check_status(&list, 0).unwrap();
        assert_eq!(check, StatusCheck { revoked: false, suspended: true });
        assert!(manager.unsuspend("c1", &list));
        assert!(manager.check_status(&list, 0).unwrap().is_clear());
    }

    #[test]
    fn expand_preserves_bits_and_indices() {
        let (manager, list) = manager_with_list(8);
        manager.assign_index("a", &list, Some(7)).unwrap();
        manager.revoke("a", &list);
        let expanded = manager.expand(&list, 9).unwrap();
        assert_eq!(expanded.capacity, 17);
        assert!(manager.check_status(&list, 7).unwrap().revoked);
        assert_eq!(manager.index_of(&list, "a").unwrap(), Some(7));
        assert!(manager.check_status(&list, 16).unwrap().is_clear());
    }

    #[test]
    fn statistics() {
        let (manager, list) = manager_with_list(10);
        manager.revoke("a", &list);
        manager.revoke("b", &list);
        manager.assign_index("c", &list, None).unwrap();
        let stats = manager.statistics(&list).unwrap();
        assert_eq!(
            stats,
            StatusStatistics {
                capacity: 10,
                used_indices: 3,
                revoked_count: 2,
                suspended_count: 0,
                available_indices: 7
            }
        );
    }

    #[test]
    fn available_indices_ignores_slots_below_the_cursor() {
        let (manager, list) = manager_with_list(6);
        manager.assign_index("high", &list, Some(3)).unwrap();
        for id in ["a", "b", "c", "d"] {
            manager.assign_index(id, &list, None).unwrap();
        }
        // a..c took 0..2, d skipped the held 3 and landed on 4.
        assert_eq!(manager.index_of(&list, "d").unwrap(), Some(4));
        let stats = manager.statistics(&list).unwrap();
        assert_eq!(stats.used_indices, 5);
        assert_eq!(stats.available_indices, 1);

        manager.assign_index("e", &list, None).unwrap();
        assert_eq!(manager.statistics(&list).unwrap().available_indices, 0);
        assert!(matches!(
            manager.assign_index("f", &list, None),
            Err(StatusListError::CapacityExhausted { .. })
        ));
    }

    #[test]
    fn set_flags_batches_and_counts_changes() {
        let (manager, list) = manager_with_list(8);
        manager.revoke("a", &list);
        let changed = manager
            .set_flags(&list, StatusPurpose::Revocation, &["a", "b", "c", "c"], true)
            .unwrap();
        assert_eq!(changed, 2);
        assert_eq!(manager.statistics(&list).unwrap().revoked_count, 3);
        let cleared = manager
            .set_flags(&list, StatusPurpose::Revocation, &["a", "zzz"], false)
            .unwrap();
        assert_eq!(cleared, 1);
    }

    #[test]
    fn set_flags_is_all_or_nothing() {
        let (manager, list) = manager_with_list(2);
        let err = manager
            .set_flags(&list, StatusPurpose::Revocation, &["a", "b", "c"], true)
            .unwrap_err();
        assert!(matches!(err, StatusListError::CapacityExhausted { .. }));
        assert_eq!(manager.statistics(&list).unwrap().used_indices, 0);
        assert!(matches!(
            manager.set_flags(&list, StatusPurpose::Suspension, &["a"], true),
            Err(StatusListError::PurposeMismatch { .. })
        ));
        assert_eq!(
            manager.set_flags("missing", StatusPurpose::Revocation, &["a"], true),
            Err(StatusListError::ListNotFound("missing".into()))
        );
    }

    #[test]
    fn apply_updates_validates_before_mutating() {
        let (manager, list) = manager_with_list(8);
        let before = manager.get_list(&list).unwrap().encoded_list;
        let err = manager
            .apply_updates(&list, &[StatusUpdate::revoke(1, true), StatusUpdate::revoke(8, true)])
            .unwrap_err();
        assert_eq!(err, StatusListError::IndexOutOfRange { index: 8, capacity: 8 });
        assert!(matches!(
            manager.apply_updates(&list, &[StatusUpdate::suspend(1, true)]),
            Err(StatusListError::PurposeMismatch { .. })
        ));
        assert_eq!(manager.get_list(&list).unwrap().encoded_list, before);

        let changed = manager
            .apply_updates(
                &list,
                &[StatusUpdate::revoke(0, true), StatusUpdate::revoke(1, true), StatusUpdate::revoke(2, false)],
            )
            .unwrap();
        assert_eq!(changed, 2);
        assert_eq!(manager.get_list(&list).unwrap().encoded_list, "wA==");
    }

    #[test]
    fn check_credential_prefers_explicit_index() {
        let (manager, list) = manager_with_list(8);
        manager.assign_index("urn:cred:1", &list, Some(0)).unwrap();
        manager.revoke("urn:cred:1", &list);

        let mut vc = VerifiableCredential::new("did:example:issuer", serde_json::json!({}));
        vc.id = Some("urn:cred:1".into());
        let mut entry = manager.status_entry(&list, "urn:cred:1").unwrap();
        assert_eq!(entry.status_list_index, Some(0));

        // An explicit index pointing elsewhere wins over the stored lookup.
        entry.status_list_index = Some(5);
        vc.credential_status.push(entry.clone());
        assert!(manager.check_credential(&vc).unwrap().is_clear());

        // Without an explicit index the credential id is looked up.
        entry.status_list_index = None;
        vc.credential_status = Default::default();
        vc.credential_status.push(entry);
        assert!(manager.check_credential(&vc).unwrap().revoked);
    }

    #[test]
    fn id_less_credential_is_found_under_its_fallback_identity() {
        let (manager, list) = manager_with_list(8);
        manager.assign_index("filler", &list, None).unwrap();
        let mut entry = manager.status_entry(&list, "holder-ref-7").unwrap();
        entry.status_list_index = None;
        manager.revoke("holder-ref-7", &list);

        let mut vc = VerifiableCredential::new("did:example:issuer", serde_json::json!({}));
        vc.credential_status.push(entry);
        assert!(manager.check_credential(&vc).unwrap().is_clear());
        assert!(manager
            .check_credential_as(&vc, Some("holder-ref-7"))
            .unwrap()
            .revoked);
        assert!(manager.check_credential_as(&vc, Some("someone-else")).unwrap().is_clear());

        // A credential id takes precedence over the fallback.
        vc.id = Some("filler".into());
        assert!(manager
            .check_credential_as(&vc, Some("holder-ref-7"))
            .unwrap()
            .is_clear());
    }

    #[test]
    fn check_credential_reports_missing_lists() {
        let manager = StatusListManager::new();
        let mut vc = VerifiableCredential::new("did:example:issuer", serde_json::json!({}));
        vc.credential_status.push(CredentialStatus {
            id: "gone#1".into(),
            status_type: STATUS_ENTRY_TYPE.into(),
            status_purpose: StatusPurpose::Revocation,
            status_list_index: Some(1),
            status_list_credential: "gone".into(),
        });
        assert_eq!(
            manager.check_credential(&vc),
            Err(StatusListError::ListNotFound("gone".into()))
        );
    }

    #[test]
    fn export_import_round_trip() {
        let (manager, list) = manager_with_list(12);
        manager.revoke("a", &list);
        manager.assign_index("b", &list, Some(10)).unwrap();
        let snapshot = manager.export_list(&list).unwrap();

        let other = StatusListManager::new();
        let imported = other.import_list(snapshot.clone()).unwrap();
        assert_eq!(imported, manager.get_list(&list).unwrap());
        assert_eq!(other.index_of(&list, "b").unwrap(), Some(10));
        assert!(other.check_assigned(&list, "a").unwrap().revoked);
        assert_eq!(other.assign_index("c", &list, None).unwrap(), 1);
        assert_eq!(
            other.import_list(snapshot),
            Err(StatusListError::ListAlreadyExists(list))
        );
    }

    #[test]
    fn import_rejects_inconsistent_snapshots() {
        let (manager, list) = manager_with_list(8);
        let mut snapshot = manager.export_list(&list).unwrap();
        snapshot.list.id = "copy".into();
        snapshot.assignments.insert("a".into(), 2);
        snapshot.assignments.insert("b".into(), 2);
        let other = StatusListManager::new();
        assert!(matches!(
            other.import_list(snapshot.clone()),
            Err(StatusListError::IndexAlreadyAssigned { .. })
        ));
        snapshot.assignments.clear();
        snapshot.list.encoded_list = "AAAA".into();
        assert!(matches!(
            other.import_list(snapshot),
            Err(StatusListError::InvalidEncoding(_))
        ));
        assert!(other.is_empty());
    }

    #[test]
    fn lookup_helpers() {
        let manager = StatusListManager::new();
        manager.create_list("alice", StatusPurpose::Revocation, 8, Some("b".into())).unwrap();
        manager.create_list("alice", StatusPurpose::Suspension, 8, Some("a".into())).unwrap();
        manager.create_list("bob", StatusPurpose::Revocation, 8, Some("c".into())).unwrap();
        assert_eq!(manager.list_ids(), vec!["a", "b", "c"]);
        let alice: Vec<_> = manager.lists_for_issuer("alice").into_iter().map(|l| l.id).collect();
        assert_eq!(alice, vec!["a", "b"]);
        assert!(manager.delete_list("b"));
        assert!(!manager.delete_list("b"));
        assert_eq!(manager.get_list("b"), Err(StatusListError::ListNotFound("b".into())));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn concurrent_assignment_never_shares_an_index() {
        let (manager, list) = manager_with_list(800);
        let manager = Arc::new(manager);
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let manager = Arc::clone(&manager);
                let list = list.clone();
                std::thread::spawn(move || {
                    (0..100)
                        .map(|i| manager.assign_index(&format!("{t}-{i}"), &list, None).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut all: Vec<usize> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 800);
        assert!(matches!(
            manager.assign_index("overflow", &list, None),
            Err(StatusListError::CapacityExhausted { .. })
        ));
    }
}
