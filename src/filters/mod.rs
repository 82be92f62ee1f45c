//! The mutation filter pipeline.
//!
//! Interceptors run strictly in configured order over one class at a time:
//! `begin` hands them the class's instruction streams, each `intercept`
//! receives the previous interceptor's survivors, and `end` releases the
//! per-class state. Filters only ever remove candidates; they never edit or
//! reorder what they keep.

mod infinite_loop;
mod iterator_loop;
mod loop_counter;
mod patterns;

pub use infinite_loop::InfiniteForLoopFilter;
pub use iterator_loop::InfiniteIteratorLoopFilter;
pub use loop_counter::AvoidLoopCounterFilter;

use std::sync::Arc;

use rayon::prelude::*;

use crate::bytecode::InstructionStream;
use crate::config::{Config, FiltersConfig};
use crate::core::{Error, MethodLocation, Result};
use crate::mutation::{Mutater, MutationDetails};

/// The instruction streams of one class under analysis, one per method.
#[derive(Debug, Clone)]
pub struct ClassStreams {
    class: String,
    methods: Vec<Arc<InstructionStream>>,
}

impl ClassStreams {
    /// Bundle a class's method streams.
    pub fn new(class: impl Into<String>, methods: Vec<InstructionStream>) -> Self {
        Self {
            class: class.into(),
            methods: methods.into_iter().map(Arc::new).collect(),
        }
    }

    /// Internal name of the class.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// All method streams.
    pub fn methods(&self) -> &[Arc<InstructionStream>] {
        &self.methods
    }

    /// The stream for a given method, if present.
    pub fn method(&self, location: &MethodLocation) -> Option<&InstructionStream> {
        self.methods
            .iter()
            .find(|stream| stream.location() == location)
            .map(|stream| stream.as_ref())
    }
}

/// A pipeline stage that vetoes candidate mutations.
///
/// Implementations must not retain the class streams past `end()`.
pub trait MutationInterceptor: Send {
    /// Stable key, also used in configuration and reports.
    fn name(&self) -> &'static str;

    /// Human-readable description for reports.
    fn description(&self) -> &'static str;

    /// Start analysis of one class.
    fn begin(&mut self, class: Arc<ClassStreams>);

    /// Filter a candidate set, returning the survivors.
    fn intercept(
        &mut self,
        candidates: Vec<MutationDetails>,
        mutater: &dyn Mutater,
    ) -> Result<Vec<MutationDetails>>;

    /// Finish analysis of the current class and drop per-class state.
    fn end(&mut self);
}

/// An ordered set of interceptors applied per class.
pub struct FilterPipeline {
    interceptors: Vec<Box<dyn MutationInterceptor>>,
}

impl FilterPipeline {
    /// Build a pipeline from explicit interceptors, applied in order.
    pub fn new(interceptors: Vec<Box<dyn MutationInterceptor>>) -> Self {
        Self { interceptors }
    }

    /// Build a pipeline from configuration, resolving filter keys against
    /// the registry in the configured order.
    pub fn from_config(config: &Config, registry: &InterceptorRegistry) -> Result<Self> {
        let interceptors = config
            .filters
            .enabled
            .iter()
            .map(|key| registry.create(key, &config.filters))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(interceptors))
    }

    /// Names and descriptions of the active interceptors, for reporting.
    pub fn interceptors(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.interceptors
            .iter()
            .map(|i| (i.name(), i.description()))
    }

    /// Run the full begin/intercept/end cycle for one class.
    ///
    /// Every interceptor sees the previous one's survivors. `end` runs on
    /// all interceptors even when one fails, so no per-class state leaks.
    pub fn run(
        &mut self,
        class: &Arc<ClassStreams>,
        candidates: Vec<MutationDetails>,
        mutater: &dyn Mutater,
    ) -> Result<Vec<MutationDetails>> {
        let before = candidates.len();
        for interceptor in &mut self.interceptors {
            interceptor.begin(Arc::clone(class));
        }

        let outcome = self.run_intercepts(candidates, mutater);

        for interceptor in &mut self.interceptors {
            interceptor.end();
        }

        if let Ok(survivors) = &outcome {
            tracing::debug!(
                class = class.class(),
                before,
                after = survivors.len(),
                "filtered candidate mutations"
            );
        }
        outcome
    }

    fn run_intercepts(
        &mut self,
        candidates: Vec<MutationDetails>,
        mutater: &dyn Mutater,
    ) -> Result<Vec<MutationDetails>> {
        let mut current = candidates;
        for interceptor in &mut self.interceptors {
            current = interceptor.intercept(current, mutater)?;
        }
        Ok(current)
    }
}

/// Factory for one interceptor kind, parameterized by the filter config.
pub type InterceptorFactory =
    Box<dyn Fn(&FiltersConfig) -> Box<dyn MutationInterceptor> + Send + Sync>;

/// Explicit mapping from stable string keys to interceptor constructors.
///
/// Keys are resolved once when a pipeline is built; no name lookup happens
/// during matching.
#[derive(Default)]
pub struct InterceptorRegistry {
    factories: Vec<(String, InterceptorFactory)>,
}

impl InterceptorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a stable key.
    pub fn register(&mut self, key: impl Into<String>, factory: InterceptorFactory) {
        self.factories.push((key.into(), factory));
    }

    /// Registered keys, in registration order.
    pub fn keys(&self) -> Vec<&str> {
        self.factories.iter().map(|(key, _)| key.as_str()).collect()
    }

    /// Instantiate the interceptor registered under `key`.
    pub fn create(&self, key: &str, config: &FiltersConfig) -> Result<Box<dyn MutationInterceptor>> {
        self.factories
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, factory)| factory(config))
            .ok_or_else(|| {
                Error::config(format!(
                    "unknown filter '{key}' (available: {})",
                    self.keys().join(", ")
                ))
            })
    }
}

/// The built-in filters under their stable keys.
pub fn default_registry() -> InterceptorRegistry {
    let mut registry = InterceptorRegistry::new();
    registry.register(
        "avoid-loop-counter",
        Box::new(|cfg| Box::new(AvoidLoopCounterFilter::new(cfg.trace))),
    );
    registry.register(
        "infinite-for-loop",
        Box::new(|cfg| Box::new(InfiniteForLoopFilter::new(cfg.trace))),
    );
    registry.register(
        "infinite-iterator-loop",
        Box::new(|cfg| Box::new(InfiniteIteratorLoopFilter::new(cfg.trace))),
    );
    registry
}

/// Filter several classes in parallel, one independent pipeline per class.
///
/// Returns each class's surviving candidates in input order.
pub fn filter_classes<M: Mutater + Sync>(
    classes: Vec<(Arc<ClassStreams>, Vec<MutationDetails>)>,
    config: &Config,
    registry: &InterceptorRegistry,
    mutater: &M,
) -> Result<Vec<(String, Vec<MutationDetails>)>> {
    classes
        .into_par_iter()
        .map(|(streams, candidates)| {
            let mut pipeline = FilterPipeline::from_config(config, registry)?;
            let survivors = pipeline.run(&streams, candidates, mutater)?;
            Ok((streams.class().to_string(), survivors))
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::testing::{candidate_at, NullMutater};
    use super::*;
    use crate::bytecode::{Instruction, Opcode};
    use crate::config::Config;

    fn simple_stream(location: MethodLocation) -> InstructionStream {
        InstructionStream::new(
            location,
            vec![
                Instruction::constant(1),
                Instruction::simple(Opcode::IReturn),
            ],
            Vec::new(),
        )
        .unwrap()
    }

    /// Interceptor that records lifecycle calls and removes nothing.
    struct Probe {
        log: Arc<std::sync::Mutex<Vec<String>>>,
        label: &'static str,
    }

    impl MutationInterceptor for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn description(&self) -> &'static str {
            "records lifecycle calls"
        }

        fn begin(&mut self, _class: Arc<ClassStreams>) {
            self.log.lock().unwrap().push(format!("begin:{}", self.label));
        }

        fn intercept(
            &mut self,
            candidates: Vec<MutationDetails>,
            _mutater: &dyn Mutater,
        ) -> Result<Vec<MutationDetails>> {
            self.log
                .lock()
                .unwrap()
                .push(format!("intercept:{}", self.label));
            Ok(candidates)
        }

        fn end(&mut self) {
            self.log.lock().unwrap().push(format!("end:{}", self.label));
        }
    }

    #[test]
    fn test_pipeline_lifecycle_order() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut pipeline = FilterPipeline::new(vec![
            Box::new(Probe {
                log: log.clone(),
                label: "a",
            }),
            Box::new(Probe {
                log: log.clone(),
                label: "b",
            }),
        ]);

        let location = MethodLocation::new("com/example/C", "m", "()V");
        let class = Arc::new(ClassStreams::new(
            "com/example/C",
            vec![simple_stream(location.clone())],
        ));
        pipeline
            .run(&class, vec![candidate_at(location, 0, "math")], &NullMutater)
            .unwrap();

        let calls = log.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "begin:a",
                "begin:b",
                "intercept:a",
                "intercept:b",
                "end:a",
                "end:b"
            ]
        );
    }

    #[test]
    fn test_class_streams_method_lookup() {
        let here = MethodLocation::new("com/example/C", "m", "()V");
        let absent = MethodLocation::new("com/example/C", "gone", "()V");
        let class = ClassStreams::new("com/example/C", vec![simple_stream(here.clone())]);

        assert!(class.method(&here).is_some());
        assert!(class.method(&absent).is_none());
        assert_eq!(class.class(), "com/example/C");
    }

    #[test]
    fn test_registry_creates_known_filters() {
        let registry = default_registry();
        let config = Config::default();

        for key in ["avoid-loop-counter", "infinite-for-loop", "infinite-iterator-loop"] {
            let interceptor = registry.create(key, &config.filters).unwrap();
            assert_eq!(interceptor.name(), key);
        }
    }

    #[test]
    fn test_registry_rejects_unknown_key() {
        let registry = default_registry();
        let config = Config::default();
        let err = registry.create("bogus", &config.filters).err().unwrap();

        let message = err.to_string();
        assert!(message.contains("unknown filter 'bogus'"));
        assert!(message.contains("avoid-loop-counter"));
    }

    #[test]
    fn test_pipeline_from_config_respects_order() {
        let mut config = Config::default();
        config.filters.enabled = vec![
            "infinite-for-loop".to_string(),
            "avoid-loop-counter".to_string(),
        ];

        let pipeline = FilterPipeline::from_config(&config, &default_registry()).unwrap();
        let names: Vec<&str> = pipeline.interceptors().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["infinite-for-loop", "avoid-loop-counter"]);
    }

    #[test]
    fn test_pipeline_from_config_fails_on_unknown_filter() {
        let mut config = Config::default();
        config.filters.enabled = vec!["bogus".to_string()];

        assert!(FilterPipeline::from_config(&config, &default_registry()).is_err());
    }
}
