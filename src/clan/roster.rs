use indexmap::IndexMap;

use super::member::Member;
use crate::scoring::MinMax;

/// Current clan members keyed by tag, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clan {
    members: IndexMap<String, Member>,
}

impl Clan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member, replacing any member with the same tag in place.
    pub fn add(&mut self, member: Member) {
        self.members.insert(member.tag.clone(), member);
    }

    pub fn get(&self, tag: &str) -> Option<&Member> {
        self.members.get(tag)
    }

    pub fn get_mut(&mut self, tag: &str) -> Option<&mut Member> {
        self.members.get_mut(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.members.contains_key(tag)
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn members_mut(&mut self) -> impl Iterator<Item = &mut Member> {
        self.members.values_mut()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sub-clan of the members matching `condition`.
    pub fn filter<F>(&self, condition: F) -> Clan
    where
        F: Fn(&Member) -> bool,
    {
        Clan {
            members: self
                .members
                .iter()
                .filter(|(_, m)| condition(m))
                .map(|(tag, m)| (tag.clone(), m.clone()))
                .collect(),
        }
    }

    /// Range of a numeric field over the members where it is defined.
    pub fn min_max<F>(&self, field: F) -> Option<MinMax>
    where
        F: Fn(&Member) -> Option<f64>,
    {
        MinMax::from_values(self.members.values().filter_map(field))
    }
}

impl FromIterator<Member> for Clan {
    fn from_iter<I: IntoIterator<Item = Member>>(iter: I) -> Self {
        let mut clan = Clan::new();
        for member in iter {
            clan.add(member);
        }
        clan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clan::Role;

    fn sample_clan() -> Clan {
        [
            Member::new("#1", "alice", Role::Ordinary, 4000),
            Member::new("#2", "bob", Role::Elevated, 6000),
            Member::new("#3", "carol", Role::Ordinary, 5000),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let clan = sample_clan();
        assert_eq!(clan.tags().collect::<Vec<_>>(), vec!["#1", "#2", "#3"]);
    }

    #[test]
    fn test_re_adding_replaces_member() {
        let mut clan = sample_clan();
        clan.add(Member::new("#2", "bobby", Role::Elevated, 6100));
        assert_eq!(clan.len(), 3);
        assert_eq!(clan.get("#2").unwrap().name, "bobby");
        assert_eq!(clan.tags().nth(1), Some("#2"));
    }

    #[test]
    fn test_filter() {
        let ordinary = sample_clan().filter(|m| m.role == Role::Ordinary);
        assert_eq!(ordinary.tags().collect::<Vec<_>>(), vec!["#1", "#3"]);
        assert!(!ordinary.contains("#2"));
    }

    #[test]
    fn test_min_max_skips_undefined_values() {
        let clan = sample_clan();
        let range = clan
            .min_max(|m| (m.role == Role::Ordinary).then_some(m.trophies as f64))
            .unwrap();
        assert_eq!(range, MinMax { min: 4000.0, max: 5000.0 });
        assert_eq!(Clan::new().min_max(|m| Some(m.trophies as f64)), None);
    }
}
