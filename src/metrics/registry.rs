use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use super::{Metric, MetricKind, MetricResult};
use crate::analysis::cohesion::CohesionAnalyzer;
use crate::analysis::complexity::{AverageMethodSize, CognitiveComplexityCalculator, NestingDepthAnalyzer};
use crate::analysis::counts::{
    ClassCounter, CommentLineCounter, CommentRatioCalculator, ConstructorCounter, GetterSetterCounter, IfCounter,
    ImportCounter, InterfaceParameterCounter, LambdaCounter, LineCounter, LoopCounter, MethodCounter,
    ObjectTypeClassifier,
};
use crate::analysis::duplication::{DuplicationConfig, ExactDuplicationDetector, NormalizedDuplicationDetector};
use crate::config::{AnalysisSettings, Config};
use crate::document::Document;
use crate::languages::Language;

/// 度量注册表
///
/// 通用度量对所有语言生效，语言度量按语言分组，按注册顺序执行。
pub struct MetricRegistry {
    /// 通用度量
    common: Vec<Arc<dyn Metric>>,
    /// 按语言分组的度量
    by_language: HashMap<Language, Vec<Arc<dyn Metric>>>,
    /// 度量阈值
    settings: AnalysisSettings,
    populated: bool,
}

impl MetricRegistry {
    /// 使用默认阈值创建并注册全部内置度量
    pub fn new() -> Self {
        Self::with_settings(AnalysisSettings::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Self::with_settings(config.analysis.clone())
    }

    pub fn with_settings(settings: AnalysisSettings) -> Self {
        let mut registry = Self::empty(settings);
        registry.register_defaults();
        registry
    }

    /// 没有任何度量的注册表
    pub fn empty(settings: AnalysisSettings) -> Self {
        Self {
            common: Vec::new(),
            by_language: HashMap::new(),
            settings,
            populated: false,
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// 注册内置度量，重复调用不会重复注册
    pub fn register_defaults(&mut self) {
        if self.populated {
            tracing::debug!("Built-in metrics already registered");
            return;
        }
        self.populated = true;

        let tab = self.settings.tab_width;
        let duplication = DuplicationConfig::from(&self.settings);

        self.register_common(Arc::new(LineCounter));
        self.register_common(Arc::new(CommentLineCounter));
        self.register_common(Arc::new(CommentRatioCalculator));
        self.register_common(Arc::new(ExactDuplicationDetector::with_config(duplication.clone())));
        self.register_common(Arc::new(NormalizedDuplicationDetector::with_config(duplication)));
        self.register_common(Arc::new(NestingDepthAnalyzer::with_tab_width(tab)));

        let imports: Arc<dyn Metric> = Arc::new(ImportCounter);
        let classes: Arc<dyn Metric> = Arc::new(ClassCounter);
        let methods: Arc<dyn Metric> = Arc::new(MethodCounter::with_tab_width(tab));
        let ifs: Arc<dyn Metric> = Arc::new(IfCounter);
        let loops: Arc<dyn Metric> = Arc::new(LoopCounter);
        let lambdas: Arc<dyn Metric> = Arc::new(LambdaCounter);
        let method_size: Arc<dyn Metric> = Arc::new(AverageMethodSize::with_tab_width(tab));
        let cohesion: Arc<dyn Metric> = Arc::new(CohesionAnalyzer::with_tab_width(tab));
        let accessors: Arc<dyn Metric> = Arc::new(GetterSetterCounter);
        let object_type: Arc<dyn Metric> = Arc::new(ObjectTypeClassifier);
        let constructors: Arc<dyn Metric> = Arc::new(ConstructorCounter);
        let interface_parameters: Arc<dyn Metric> = Arc::new(InterfaceParameterCounter);
        let cognitive: Arc<dyn Metric> = Arc::new(CognitiveComplexityCalculator::with_tab_width(tab));

        self.register_all(
            Language::CSharp,
            [
                &imports, &classes, &methods, &ifs, &loops, &lambdas, &method_size, &cohesion, &accessors,
                &object_type, &constructors, &interface_parameters, &cognitive,
            ],
        );
        self.register_all(
            Language::Java,
            [
                &imports, &ifs, &loops, &lambdas, &methods, &classes, &method_size, &cohesion, &accessors,
                &constructors, &object_type, &cognitive,
            ],
        );
        self.register_all(
            Language::JavaScript,
            [
                &imports, &ifs, &loops, &lambdas, &methods, &classes, &method_size, &cohesion, &constructors,
                &cognitive,
            ],
        );
        self.register_all(
            Language::TypeScript,
            [
                &imports, &ifs, &loops, &lambdas, &methods, &classes, &method_size, &cohesion, &constructors,
                &cognitive, &object_type, &accessors, &interface_parameters,
            ],
        );
        self.register_all(
            Language::Python,
            [
                &imports, &ifs, &loops, &lambdas, &methods, &classes, &method_size, &cohesion, &constructors,
                &object_type, &cognitive,
            ],
        );

        tracing::debug!(
            "Registered {} common metrics and metrics for {} languages",
            self.common.len(),
            self.by_language.len()
        );
    }

    fn register_all<const N: usize>(&mut self, language: Language, metrics: [&Arc<dyn Metric>; N]) {
        for metric in metrics {
            self.register(language, Arc::clone(metric));
        }
    }

    /// 注册对所有语言生效的度量
    pub fn register_common(&mut self, metric: Arc<dyn Metric>) {
        self.common.push(metric);
    }

    /// 为指定语言注册度量
    pub fn register(&mut self, language: Language, metric: Arc<dyn Metric>) {
        self.by_language.entry(language).or_insert_with(Vec::new).push(metric);
    }

    /// 通用度量在前，语言度量在后
    pub fn metrics_for(&self, language: Language) -> Vec<Arc<dyn Metric>> {
        let specific = self.by_language.get(&language).map(Vec::as_slice).unwrap_or(&[]);
        self.common.iter().chain(specific).cloned().collect()
    }

    pub fn kinds_for(&self, language: Language) -> Vec<MetricKind> {
        self.metrics_for(language).iter().map(|metric| metric.kind()).collect()
    }

    /// 分析文档，单个度量失败只影响它自己的结果
    pub fn analyze(&self, document: &Document) -> Vec<MetricResult> {
        self.analyze_kinds(document)
            .into_iter()
            .map(|(_, result)| result)
            .collect()
    }

    /// 与 [`analyze`](Self::analyze) 相同，同时返回每个结果对应的度量种类
    pub fn analyze_kinds(&self, document: &Document) -> Vec<(MetricKind, MetricResult)> {
        self.metrics_for(document.language())
            .iter()
            .map(|metric| (metric.kind(), Self::run(metric.as_ref(), document)))
            .collect()
    }

    fn run(metric: &dyn Metric, document: &Document) -> MetricResult {
        let start_time = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| metric.extract(document)));

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(error)) => {
                tracing::warn!(
                    "Metric {} failed ({:?}): {}",
                    metric.kind(),
                    error.severity(),
                    error
                );
                MetricResult::zero(metric.label())
            }
            Err(payload) => {
                tracing::warn!("Metric {} panicked: {}", metric.kind(), panic_message(payload.as_ref()));
                MetricResult::zero(metric.label())
            }
        };

        tracing::debug!(
            "Metric {} on {} document finished in {:?}",
            metric.kind(),
            document.language(),
            start_time.elapsed()
        );
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}
