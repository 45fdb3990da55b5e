//! Recursive resolution of `{{...}}` references.
//!
//! A resolution chain carries two pieces of state: the remaining depth,
//! starting at [`MAX_RESOLUTION_DEPTH`], and the set of table IDs and names
//! already entered on the path from the root. A table joins that set when
//! resolution of a reference to it begins, so a single-entry table that
//! references itself is caught on the first nested hop. Each reference hands
//! its own copy of the set to the rolls beneath it; sibling references never
//! see each other's tables.
//!
//! Nothing here fails on bad references. A reference whose table cannot be
//! found, or whose table has no entries, stays in the output verbatim; a
//! reference back into the active chain becomes a circular-reference marker;
//! running out of depth returns whatever has been substituted so far. Only
//! repository failures propagate.

use std::collections::HashSet;

use tafel_core::{
    MAX_RESOLUTION_DEPTH, RandomSource, RandomTable, RollResult, RollTemplate, TemplateReference,
};
use tracing::{debug, warn};

use crate::error::EngineResult;
use crate::ports::{TableFilter, TableRepository};

/// Table IDs and names entered along the current resolution chain.
pub type Visited = HashSet<String>;

/// Resolves references by rolling on tables fetched from a repository.
pub struct TemplateResolver<'a, T: ?Sized, R: ?Sized> {
    tables: &'a T,
    rng: &'a mut R,
}

impl<'a, T, R> TemplateResolver<'a, T, R>
where
    T: TableRepository + ?Sized,
    R: RandomSource + ?Sized,
{
    /// Create a resolver over `tables` drawing from `rng`.
    pub fn new(tables: &'a T, rng: &'a mut R) -> Self {
        Self { tables, rng }
    }

    /// Resolve a standalone template as the root of a fresh chain.
    pub fn resolve_template(&mut self, template: &RollTemplate) -> EngineResult<String> {
        self.resolve(template, MAX_RESOLUTION_DEPTH, &Visited::new())
    }

    /// Resolve the content of a roll made on `table`.
    ///
    /// Non-template results are returned unchanged. Template results come
    /// back with `resolved_content` set; `table` itself counts as visited.
    pub fn resolve_roll(
        &mut self,
        table: &RandomTable,
        result: RollResult,
    ) -> EngineResult<RollResult> {
        if !result.is_template {
            return Ok(result);
        }
        let resolved = self.resolve(
            &RollTemplate::new(result.content.as_str()),
            MAX_RESOLUTION_DEPTH,
            &chain_with(&Visited::new(), table),
        )?;
        Ok(result.with_resolved_content(resolved))
    }

    /// Substitute every reference in `template`, recursing into rolled
    /// content with `depth - 1`. Returns the text unchanged once `depth`
    /// reaches zero.
    pub fn resolve(
        &mut self,
        template: &RollTemplate,
        depth: u32,
        visited: &Visited,
    ) -> EngineResult<String> {
        if depth == 0 {
            return Ok(template.to_string());
        }
        let references = template.extract_references();
        if references.is_empty() {
            return Ok(template.to_string());
        }

        let mut current = template.clone();
        for reference in &references {
            if reference.is_unresolvable() {
                continue;
            }
            let Some(table) = self.find_table(reference)? else {
                warn!(reference = %reference, "referenced table not found, leaving reference in place");
                continue;
            };

            if visited.contains(table.id()) || visited.contains(table.name()) {
                warn!(table = table.id(), "circular reference detected");
                current = current.replace_reference(reference, &circular_marker(&table));
                continue;
            }
            if table.is_empty() {
                warn!(table = table.id(), "referenced table has no entries, leaving reference in place");
                continue;
            }

            let chain = chain_with(visited, &table);
            let rolls = self.roll_on(&table, reference.roll_count, depth - 1, &chain)?;
            current = current.replace_reference(reference, &rolls.join(&reference.separator));
        }

        if current.has_unresolved_references() && depth > 1 {
            return self.resolve(&current, depth - 1, visited);
        }
        Ok(current.into_string())
    }

    fn roll_on(
        &mut self,
        table: &RandomTable,
        count: u32,
        depth: u32,
        chain: &Visited,
    ) -> EngineResult<Vec<String>> {
        let mut rolls = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let result = table.roll(&mut *self.rng)?;
            debug!(table = table.id(), entry = %result.entry_id, depth, "rolled referenced table");
            if result.is_template {
                rolls.push(self.resolve(&RollTemplate::new(result.content), depth, chain)?);
            } else {
                rolls.push(result.content);
            }
        }
        Ok(rolls)
    }

    /// Look up by ID, then fall back to an exact name match over all tables.
    fn find_table(&self, reference: &TemplateReference) -> EngineResult<Option<RandomTable>> {
        if !reference.table_id.is_empty() {
            if let Some(table) = self.tables.get_by_id(&reference.table_id)? {
                return Ok(Some(table));
            }
        }
        if reference.table_name.is_empty() {
            return Ok(None);
        }
        let tables = self.tables.list(&TableFilter::default())?;
        Ok(tables
            .into_iter()
            .find(|t| t.name() == reference.table_name))
    }
}

fn chain_with(visited: &Visited, table: &RandomTable) -> Visited {
    let mut chain = visited.clone();
    chain.insert(table.id().to_string());
    chain.insert(table.name().to_string());
    chain
}

fn circular_marker(table: &RandomTable) -> String {
    let label = if table.name().is_empty() {
        table.id()
    } else {
        table.name()
    };
    format!("[Circular reference detected: {label}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryTableRepository;
    use crate::ports::MockTableRepository;
    use proptest::prelude::*;
    use tafel_core::{SequenceRandom, TableEntry};

    fn colors() -> RandomTable {
        RandomTable::with_entries(
            "colors",
            "Colors",
            "",
            ["Red", "Blue", "Green", "Yellow", "Purple"]
                .into_iter()
                .map(|c| TableEntry::simple(c.to_lowercase(), c)),
        )
        .unwrap()
    }

    fn rgb() -> RandomTable {
        RandomTable::with_entries(
            "colors",
            "Colors",
            "",
            [
                TableEntry::simple("red", "Red"),
                TableEntry::simple("blue", "Blue"),
                TableEntry::simple("green", "Green"),
            ],
        )
        .unwrap()
    }

    fn single(id: &str, name: &str, content: &str) -> RandomTable {
        RandomTable::with_entries(id, name, "", [TableEntry::simple("only", content)]).unwrap()
    }

    fn repo(tables: impl IntoIterator<Item = RandomTable>) -> InMemoryTableRepository {
        let repo = InMemoryTableRepository::new();
        for table in tables {
            repo.save(&table).unwrap();
        }
        repo
    }

    fn resolve(repo: &InMemoryTableRepository, draws: Vec<f64>, text: &str) -> String {
        let mut rng = SequenceRandom::new(draws);
        TemplateResolver::new(repo, &mut rng)
            .resolve_template(&RollTemplate::new(text))
            .unwrap()
    }

    #[test]
    fn plain_text_is_unchanged() {
        let repo = repo([colors()]);
        assert_eq!(resolve(&repo, vec![0.5], "no references here"), "no references here");
    }

    #[test]
    fn single_reference() {
        let repo = repo([colors()]);
        assert_eq!(
            resolve(&repo, vec![0.1], "My favorite color is {{Color::colors::Colors}}"),
            "My favorite color is Red"
        );
    }

    #[test]
    fn repeated_rolls_are_joined() {
        // three entries: 0.1, 0.4, 0.7 land on the first, second and third
        let repo = repo([rgb()]);
        assert_eq!(
            resolve(&repo, vec![0.1, 0.4, 0.7], "{{Colors::colors::Colors::3::, }}"),
            "Red, Blue, Green"
        );
    }

    #[test]
    fn custom_separator() {
        let repo = repo([colors()]);
        assert_eq!(
            resolve(&repo, vec![0.1, 0.9], "{{C::colors::Colors::2:: and }}"),
            "Red and Purple"
        );
    }

    #[test]
    fn identical_references_consume_draws_left_to_right() {
        let repo = repo([colors()]);
        assert_eq!(
            resolve(
                &repo,
                vec![0.1, 0.9],
                "{{C::colors::Colors}} or {{C::colors::Colors}}"
            ),
            "Red or Purple"
        );
    }

    #[test]
    fn name_fallback_when_id_missing() {
        let repo = repo([colors()]);
        assert_eq!(resolve(&repo, vec![0.3], "{{C::nope::Colors}}"), "Blue");
        assert_eq!(resolve(&repo, vec![0.3], "{{C::::Colors}}"), "Blue");
    }

    #[test]
    fn missing_table_left_verbatim() {
        let repo = repo([colors()]);
        let text = "A {{Thing::missing::Missing}} and {{C::colors::Colors}}";
        assert_eq!(resolve(&repo, vec![0.1], text), "A {{Thing::missing::Missing}} and Red");
    }

    #[test]
    fn empty_reference_left_verbatim() {
        let repo = repo([colors()]);
        assert_eq!(resolve(&repo, vec![0.1], "x {{}} y"), "x {{}} y");
        assert_eq!(resolve(&repo, vec![0.1], "{{only a title}}"), "{{only a title}}");
    }

    #[test]
    fn empty_table_left_verbatim() {
        let empty = RandomTable::new("empty", "Empty", "").unwrap();
        let repo = repo([empty]);
        assert_eq!(resolve(&repo, vec![0.1], "{{E::empty::Empty}}"), "{{E::empty::Empty}}");
    }

    #[test]
    fn nested_references_resolve() {
        let pets = single("pets", "Pets", "a {{Color::colors::Colors}} dog");
        let repo = repo([colors(), pets]);
        assert_eq!(resolve(&repo, vec![0.5], "I own {{Pet::pets::Pets}}"), "I own a Green dog");
    }

    #[test]
    fn self_reference_is_marked() {
        let looping = single("loop", "Loop", "again {{L::loop::Loop}}");
        let repo = repo([looping]);
        let out = resolve(&repo, vec![0.5], "{{L::loop::Loop}}");
        assert_eq!(out, "again [Circular reference detected: Loop]");
    }

    #[test]
    fn mutual_reference_is_marked() {
        let a = single("a", "A", "A references B: {{B::b::B}}");
        let b = single("b", "B", "B references A: {{A::a::A}}");
        let repo = repo([a, b]);
        let out = resolve(&repo, vec![0.5], "Start with A: {{A::a::A}}");
        assert_eq!(
            out,
            "Start with A: A references B: B references A: [Circular reference detected: A]"
        );
    }

    #[test]
    fn siblings_do_not_share_history() {
        // the second reference to the same table is not a cycle
        let repo = repo([colors()]);
        let out = resolve(
            &repo,
            vec![0.1, 0.3],
            "{{A::colors::Colors}} / {{B::colors::Colors}}",
        );
        assert_eq!(out, "Red / Blue");
        assert!(!out.contains("Circular"));
    }

    /// `len` single-entry tables where `t{i}` rolls `"{i}>"` followed by a
    /// reference to `t{i+1}`. The last table rolls `"end"`.
    fn chain(len: usize) -> InMemoryTableRepository {
        repo((0..len).map(|i| {
            let content = if i + 1 == len {
                "end".to_string()
            } else {
                format!("{i}>{{{{N::t{next}::T{next}}}}}", next = i + 1)
            };
            single(&format!("t{i}"), &format!("T{i}"), &content)
        }))
    }

    #[test]
    fn deep_chain_finishes_through_extra_passes() {
        // nesting alone reaches t4; the pass repeated at each level picks up t5 and t6
        let repo = chain(MAX_RESOLUTION_DEPTH as usize + 2);
        let mut rng = SequenceRandom::constant(0.5);
        let out = TemplateResolver::new(&repo, &mut rng)
            .resolve_template(&RollTemplate::new("{{N::t0::T0}}"))
            .unwrap();
        assert_eq!(out, "0>1>2>3>4>5>end");
        assert_eq!(rng.draws(), 7);
    }

    #[test]
    fn chain_beyond_reach_keeps_trailing_reference() {
        // each level at depth d reaches 2^d - 1 tables, so 31 from the root
        let repo = chain(40);
        let mut rng = SequenceRandom::constant(0.5);
        let out = TemplateResolver::new(&repo, &mut rng)
            .resolve_template(&RollTemplate::new("{{N::t0::T0}}"))
            .unwrap();
        let expected: String = (0..31).map(|i| format!("{i}>")).collect::<String>()
            + "{{N::t31::T31}}";
        assert_eq!(out, expected);
        assert_eq!(rng.draws(), 31);
    }

    #[test]
    fn non_canonical_reference_stays_verbatim() {
        // a count without a separator is rewritten in full form, which is not in the text
        let repo = repo([colors()]);
        let mut rng = SequenceRandom::constant(0.1);
        let out = TemplateResolver::new(&repo, &mut rng)
            .resolve_template(&RollTemplate::new("{{C::colors::Colors::3}}"))
            .unwrap();
        assert_eq!(out, "{{C::colors::Colors::3}}");
        // three rolls on every one of the five passes
        assert_eq!(rng.draws(), 15);
    }

    #[test]
    fn zero_depth_returns_input() {
        let repo = repo([colors()]);
        let mut rng = SequenceRandom::constant(0.1);
        let template = RollTemplate::new("{{C::colors::Colors}}");
        let out = TemplateResolver::new(&repo, &mut rng)
            .resolve(&template, 0, &Visited::new())
            .unwrap();
        assert_eq!(out, "{{C::colors::Colors}}");
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn resolve_roll_marks_origin_table_visited() {
        let looping = single("loop", "Loop", "again {{L::loop::Loop}}");
        let repo = repo([looping.clone()]);
        let mut rng = SequenceRandom::constant(0.5);
        let rolled = looping.roll(&mut rng).unwrap();
        let resolved = TemplateResolver::new(&repo, &mut rng)
            .resolve_roll(&looping, rolled)
            .unwrap();
        assert_eq!(
            resolved.resolved_content.as_deref(),
            Some("again [Circular reference detected: Loop]")
        );
        assert_eq!(resolved.content, "again {{L::loop::Loop}}");
    }

    #[test]
    fn resolve_roll_leaves_plain_results_alone() {
        let table = colors();
        let repo = repo([table.clone()]);
        let mut rng = SequenceRandom::constant(0.1);
        let rolled = table.roll(&mut rng).unwrap();
        let resolved = TemplateResolver::new(&repo, &mut rng)
            .resolve_roll(&table, rolled)
            .unwrap();
        assert!(resolved.resolved_content.is_none());
    }

    #[test]
    fn id_lookup_skips_listing() {
        let mut mock = MockTableRepository::new();
        mock.expect_get_by_id()
            .withf(|id| id == "colors")
            .times(1)
            .returning(|_| Ok(Some(colors())));
        mock.expect_list().times(0);
        let mut rng = SequenceRandom::constant(0.1);
        let out = TemplateResolver::new(&mock, &mut rng)
            .resolve_template(&RollTemplate::new("{{C::colors::Colors}}"))
            .unwrap();
        assert_eq!(out, "Red");
    }

    #[test]
    fn name_lookup_lists_once_per_reference() {
        let mut mock = MockTableRepository::new();
        mock.expect_get_by_id().returning(|_| Ok(None));
        mock.expect_list()
            .times(1)
            .returning(|_| Ok(vec![colors()]));
        let mut rng = SequenceRandom::constant(0.1);
        let out = TemplateResolver::new(&mock, &mut rng)
            .resolve_template(&RollTemplate::new("{{C::stale-id::Colors}}"))
            .unwrap();
        assert_eq!(out, "Red");
    }

    #[test]
    fn repository_failures_propagate() {
        let mut mock = MockTableRepository::new();
        mock.expect_get_by_id().returning(|_| {
            Err(crate::error::RepoError::Storage {
                operation: "get_by_id",
                message: "disk on fire".to_string(),
            })
        });
        let mut rng = SequenceRandom::constant(0.1);
        let err = TemplateResolver::new(&mock, &mut rng)
            .resolve_template(&RollTemplate::new("{{C::colors::Colors}}"))
            .unwrap_err();
        assert!(err.to_string().contains("disk on fire"));
    }

    proptest! {
        #[test]
        fn text_without_references_is_unchanged(text in "[^{}]{0,40}") {
            let repo = repo([colors()]);
            prop_assert_eq!(resolve(&repo, vec![0.5], &text), text);
        }

        #[test]
        fn resolution_draws_once_per_roll(count in 1u32..6) {
            let repo = repo([colors()]);
            let mut rng = SequenceRandom::new(vec![0.1]);
            let text = format!("{{{{C::colors::Colors::{count}::,}}}}");
            let out = TemplateResolver::new(&repo, &mut rng)
                .resolve_template(&RollTemplate::new(text))
                .unwrap();
            prop_assert_eq!(rng.draws(), count as usize);
            prop_assert_eq!(out.split(',').count(), count as usize);
        }
    }
}
