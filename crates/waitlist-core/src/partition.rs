use std::collections::BTreeMap;

use waitlist_model::PatientId;

/// Split a collection into per-patient partitions, keeping input order
/// within each partition. Partitions come back ordered by patient id.
pub fn partition_by_patient<T, F>(
    items: impl IntoIterator<Item = T>,
    key: F,
) -> BTreeMap<PatientId, Vec<T>>
where
    F: Fn(&T) -> &PatientId,
{
    let mut partitions: BTreeMap<PatientId, Vec<T>> = BTreeMap::new();
    for item in items {
        let patient_id = key(&item).clone();
        partitions.entry(patient_id).or_default().push(item);
    }
    partitions
}
