use crate::error::{Error, Result};
use arena_core::fingerprint;
use arena_providers::SCENARIO_HINT_KEY;
use arena_types::{Params, ProviderId, Region, RunSpec, Scenario, ScenarioId};
use serde_json::json;

/// Optional set-intersection filters applied before expansion. `None` means
/// "no filter", i.e. keep every loaded entity.
#[derive(Debug, Clone, Default)]
pub struct PlanFilters {
    pub scenarios: Option<Vec<ScenarioId>>,
    pub providers: Option<Vec<ProviderId>>,
    pub regions: Option<Vec<Region>>,
}

/// Everything the Planner needs to derive a `RunPlan` (spec §4.1).
pub struct PlanInput<'a> {
    pub scenarios: &'a [Scenario],
    pub providers: &'a [ProviderId],
    pub regions: &'a [Region],
    pub base_params: Params,
    pub filters: PlanFilters,
}

/// Expands a loaded configuration into a deterministic, ordered list of
/// `RunSpec`s.
pub struct Planner;

impl Planner {
    /// Cartesian product of the filtered (scenario, provider, region) sets,
    /// lexicographically ordered with scenarios outermost and regions
    /// innermost so progress displays group by scenario (spec §4.1).
    pub fn plan(input: PlanInput<'_>) -> Result<Vec<RunSpec>> {
        let scenarios = filter_scenarios(input.scenarios, input.filters.scenarios.as_deref());
        let providers = filter_by(input.providers, input.filters.providers.as_deref());
        let regions = filter_by(input.regions, input.filters.regions.as_deref());

        if scenarios.is_empty() || providers.is_empty() || regions.is_empty() {
            return Err(Error::NoRuns);
        }

        for scenario in &scenarios {
            validate_self_play_bindings(scenario)?;
        }

        let mut specs = Vec::with_capacity(scenarios.len() * providers.len() * regions.len());
        for scenario in &scenarios {
            for provider in &providers {
                for region in &regions {
                    let self_play_roles = scenario.self_play.clone();
                    let params = with_scenario_hint(&input.base_params, &scenario.id);
                    let id = fingerprint::run_id(&scenario.id, provider, region, &params, self_play_roles.as_ref());
                    specs.push(RunSpec {
                        id,
                        scenario_id: scenario.id.clone(),
                        provider_id: (*provider).clone(),
                        region: (*region).clone(),
                        params,
                        self_play_roles,
                    });
                }
            }
        }

        Ok(specs)
    }
}

/// Every self-play role a scenario's turns reference must be bound, or
/// planning fails fast (spec §9 Open Question 3: no implicit fallback).
fn validate_self_play_bindings(scenario: &Scenario) -> Result<()> {
    for turn in &scenario.turns {
        if !turn.is_self_play() {
            continue;
        }
        let bound = scenario
            .self_play
            .as_ref()
            .is_some_and(|binding| binding.contains_key(&turn.role));
        if !bound {
            return Err(Error::UnboundSelfPlayRole {
                scenario: scenario.id.as_str().to_string(),
                role: turn.role.clone(),
            });
        }
    }
    Ok(())
}

/// `MockProvider` (and any future scripted provider) identifies which
/// scenario a call belongs to through `Params.extra[SCENARIO_HINT_KEY]`
/// rather than a dedicated `Params` field, since the scenario is otherwise
/// invisible to a `Provider::complete` call that only sees history and
/// params. The Planner stamps it in here so every `RunSpec` carries it.
fn with_scenario_hint(base: &Params, scenario_id: &ScenarioId) -> Params {
    let mut params = base.clone();
    params.extra.insert(SCENARIO_HINT_KEY.to_string(), json!(scenario_id.as_str()));
    params
}

fn filter_scenarios<'a>(all: &'a [Scenario], keep: Option<&[ScenarioId]>) -> Vec<&'a Scenario> {
    let mut kept: Vec<&Scenario> = match keep {
        None => all.iter().collect(),
        Some(ids) => all.iter().filter(|s| ids.contains(&s.id)).collect(),
    };
    kept.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
    kept
}

fn filter_by<'a, T>(all: &'a [T], keep: Option<&[T]>) -> Vec<&'a T>
where
    T: Ord,
{
    let mut kept: Vec<&T> = match keep {
        None => all.iter().collect(),
        Some(wanted) => all.iter().filter(|item| wanted.contains(item)).collect(),
    };
    kept.sort();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_types::TurnDefinition;

    fn scenario(id: &str) -> Scenario {
        Scenario {
            id: ScenarioId::from(id),
            turns: vec![TurnDefinition {
                role: "user".into(),
                content: Some("hi".into()),
                persona: None,
                turns: None,
                assertions: vec![],
                tool_calls_allowed: false,
            }],
            conversation_assertions: vec![],
            self_play: None,
        }
    }

    #[test]
    fn expands_full_cartesian_product() {
        let scenarios = vec![scenario("a"), scenario("b")];
        let providers = vec![ProviderId::from("mock-1"), ProviderId::from("mock-2")];
        let regions = vec![Region::from("us")];

        let specs = Planner::plan(PlanInput {
            scenarios: &scenarios,
            providers: &providers,
            regions: &regions,
            base_params: Params::new(),
            filters: PlanFilters::default(),
        })
        .unwrap();

        assert_eq!(specs.len(), 4);
    }

    #[test]
    fn plan_order_is_scenario_major_region_minor() {
        let scenarios = vec![scenario("a"), scenario("b")];
        let providers = vec![ProviderId::from("p1")];
        let regions = vec![Region::from("eu"), Region::from("us")];

        let specs = Planner::plan(PlanInput {
            scenarios: &scenarios,
            providers: &providers,
            regions: &regions,
            base_params: Params::new(),
            filters: PlanFilters::default(),
        })
        .unwrap();

        let ordering: Vec<(&str, &str)> = specs
            .iter()
            .map(|s| (s.scenario_id.as_str(), s.region.as_str()))
            .collect();
        assert_eq!(
            ordering,
            vec![("a", "eu"), ("a", "us"), ("b", "eu"), ("b", "us")]
        );
    }

    #[test]
    fn empty_filter_intersection_is_fatal() {
        let scenarios = vec![scenario("a")];
        let providers = vec![ProviderId::from("p1")];
        let regions = vec![Region::from("us")];

        let result = Planner::plan(PlanInput {
            scenarios: &scenarios,
            providers: &providers,
            regions: &regions,
            base_params: Params::new(),
            filters: PlanFilters {
                scenarios: Some(vec![ScenarioId::from("does-not-exist")]),
                ..Default::default()
            },
        });

        assert!(matches!(result, Err(Error::NoRuns)));
    }

    #[test]
    fn identical_params_and_filters_reproduce_identical_run_ids() {
        let scenarios = vec![scenario("a")];
        let providers = vec![ProviderId::from("p1")];
        let regions = vec![Region::from("us")];

        let first = Planner::plan(PlanInput {
            scenarios: &scenarios,
            providers: &providers,
            regions: &regions,
            base_params: Params::new(),
            filters: PlanFilters::default(),
        })
        .unwrap();
        let second = Planner::plan(PlanInput {
            scenarios: &scenarios,
            providers: &providers,
            regions: &regions,
            base_params: Params::new(),
            filters: PlanFilters::default(),
        })
        .unwrap();

        assert_eq!(first[0].id, second[0].id);
    }

    #[test]
    fn unbound_self_play_role_is_a_plan_error() {
        let mut scenario = scenario("debate");
        scenario.turns.push(TurnDefinition {
            role: "skeptic".into(),
            content: None,
            persona: Some("skeptic".into()),
            turns: Some(2),
            assertions: vec![],
            tool_calls_allowed: false,
        });
        let scenarios = vec![scenario];
        let providers = vec![ProviderId::from("p1")];
        let regions = vec![Region::from("us")];

        let result = Planner::plan(PlanInput {
            scenarios: &scenarios,
            providers: &providers,
            regions: &regions,
            base_params: Params::new(),
            filters: PlanFilters::default(),
        });

        assert!(matches!(result, Err(Error::UnboundSelfPlayRole { .. })));
    }
}
