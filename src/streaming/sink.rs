use std::hash::Hash;

use indexmap::IndexMap;

use super::pipeline::Pipeline;
use crate::engine::PipelineError;
use crate::step::{Arg, Value};

impl<T: Arg> Pipeline<T> {
    /// Output values converted to `U`; values of another type are reported and skipped
    pub fn iter_as<U: Arg>(&mut self) -> impl Iterator<Item = U> + '_ {
        let options = self.options().clone();
        self.iter().filter_map(move |value| match U::from_value(value) {
            Ok(out) => Some(out),
            Err(e) => {
                options.report(PipelineError::Conversion(e));
                None
            }
        })
    }

    pub fn to_vec(&mut self) -> Vec<Value> {
        self.iter().collect()
    }

    pub fn collect<U: Arg>(&mut self) -> Vec<U> {
        self.iter_as().collect()
    }

    /// Indexed output as a map; later keys overwrite earlier ones
    pub fn to_map<K, V>(&mut self) -> IndexMap<K, V>
    where
        K: Arg + Eq + Hash,
        V: Arg,
    {
        let options = self.options().clone();
        let mut map = IndexMap::new();
        for (key, value) in self.iter_indexed() {
            match (K::from_value(key), V::from_value(value)) {
                (Ok(key), Ok(value)) => {
                    map.insert(key, value);
                }
                (Err(e), _) | (_, Err(e)) => options.report(PipelineError::Conversion(e)),
            }
        }
        map
    }

    /// The grouped map produced by a `group_by` aggregator, empty if nothing was grouped
    pub fn to_multimap<K, V>(&mut self) -> IndexMap<K, Vec<V>>
    where
        K: Arg + Eq + Hash,
        V: Arg,
    {
        self.iter_as::<IndexMap<K, Vec<V>>>()
            .last()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use crate::aggregate::group_by;
    use crate::ops::map;
    use crate::step::Steps;
    use crate::streaming::{CollectErrors, Pipeline};
    use indexmap::IndexMap;

    #[test]
    fn collect_converts_outputs() {
        let mut p = Pipeline::new(vec![1, 2], Steps::new().then(map(|x: i32| x.to_string())));
        assert_eq!(p.collect::<String>(), vec!["1", "2"]);
    }

    #[test]
    fn collect_reports_conversion_errors() {
        let errors = CollectErrors::new();
        let mut p = Pipeline::new(vec![1], Steps::new()).with_error_handler(errors.clone());
        assert!(p.collect::<String>().is_empty());
        assert_eq!(errors.len(), 1);
        assert!(errors.messages()[0].starts_with("Output conversion failed"));
    }

    #[test]
    fn to_map_uses_positions_as_keys() {
        let mut p = Pipeline::new(vec![10, 20], Steps::new());
        let map: IndexMap<usize, i32> = p.to_map();
        assert_eq!(map.get(&0), Some(&10));
        assert_eq!(map.get(&1), Some(&20));
    }

    #[test]
    fn to_multimap_returns_grouping() {
        let mut p = Pipeline::new(
            vec![1, 2, 3, 4],
            Steps::new().aggregate(group_by(|x: i32| (x % 2 == 0, x))),
        );
        let groups: IndexMap<bool, Vec<i32>> = p.to_multimap();
        assert_eq!(groups[&false], vec![1, 3]);
        assert_eq!(groups[&true], vec![2, 4]);
    }

    #[test]
    fn to_multimap_of_empty_input_is_empty() {
        let mut p = Pipeline::new(
            Vec::<i32>::new(),
            Steps::new().aggregate(group_by(|x: i32| (x, x))),
        );
        assert!(p.to_multimap::<i32, i32>().is_empty());
    }
}
