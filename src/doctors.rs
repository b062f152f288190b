use crate::models::Doctor;

/// Case-insensitive name search over a fetched doctor list.
pub fn filter_doctors<'a>(doctors: &'a [Doctor], search: &str) -> Vec<&'a Doctor> {
    let needle = search.trim().to_lowercase();
    doctors
        .iter()
        .filter(|doctor| doctor.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn find_doctor(doctors: &[Doctor], id: i64) -> Option<&Doctor> {
    doctors.iter().find(|doctor| doctor.id == id)
}
