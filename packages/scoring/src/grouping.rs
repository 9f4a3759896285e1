//! Athlete grouping shared by totals, the daily rule and team pages.

use std::collections::HashMap;

use fitboard_activity_models::CanonicalActivity;
use fitboard_scoring_models::IdentityKey;

/// Activities of one athlete, borrowed from the normalized set.
#[derive(Debug, Clone)]
pub struct AthleteGroup<'a> {
    /// Athlete identifier.
    pub athlete_id: &'a str,
    /// Name of the first activity in the group.
    pub name: &'a str,
    /// First team named by any of the group's activities.
    pub team_id: Option<&'a str>,
    /// The athlete's activities, in input order.
    pub activities: Vec<&'a CanonicalActivity>,
}

/// Groups activities by athlete, in first-appearance order.
///
/// With [`IdentityKey::IdAndName`] the same id under two names yields two
/// groups; with [`IdentityKey::IdOnly`] the first name seen labels the
/// group.
#[must_use]
pub fn group_by_athlete<'a, I>(activities: I, identity: IdentityKey) -> Vec<AthleteGroup<'a>>
where
    I: IntoIterator<Item = &'a CanonicalActivity>,
{
    let mut index: HashMap<(&'a str, Option<&'a str>), usize> = HashMap::new();
    let mut groups: Vec<AthleteGroup<'a>> = Vec::new();

    for activity in activities {
        let id = activity.athlete_id.trim();
        let name = activity.athlete_name.trim();
        let key = match identity {
            IdentityKey::IdAndName => (id, Some(name)),
            IdentityKey::IdOnly => (id, None),
        };

        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(AthleteGroup {
                athlete_id: id,
                name,
                team_id: None,
                activities: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        if group.team_id.is_none() {
            group.team_id = activity.team_id.as_deref();
        }
        group.activities.push(activity);
    }

    groups
}
