use crate::models::Feature;

/// Result of checking one feature list against a facility code
#[derive(Debug, Clone, PartialEq)]
pub struct Availability<'a> {
    /// Features of the target facility, in response order
    pub matching: Vec<&'a Feature>,
    /// Matching features whose occupancy coerces to 0
    pub free: Vec<&'a Feature>,
}

impl<'a> Availability<'a> {
    pub fn evaluate(features: &'a [Feature], facility_code: &str) -> Self {
        let matching = matching_facility(features, facility_code);
        let free = free_spots(matching.iter().copied());
        Self { matching, free }
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// An email goes out when something is free, or always in heartbeat mode
    pub fn should_notify(&self, heartbeat: bool) -> bool {
        !self.free.is_empty() || heartbeat
    }
}

/// Features whose `cod_parcare` is exactly `facility_code`
pub fn matching_facility<'a, I>(features: I, facility_code: &str) -> Vec<&'a Feature>
where
    I: IntoIterator<Item = &'a Feature>,
{
    features
        .into_iter()
        .filter(|f| f.facility_code() == Some(facility_code))
        .collect()
}

/// Features whose `ocupat` is numerically 0
pub fn free_spots<'a, I>(features: I) -> Vec<&'a Feature>
where
    I: IntoIterator<Item = &'a Feature>,
{
    features.into_iter().filter(|f| f.is_free()).collect()
}
