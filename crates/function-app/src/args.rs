use flexfn_azure::web::{FunctionsRuntime, NameValuePair, ScaleAndConcurrency};
use flexfn_output::Output;

/// Memory per instance when none (or zero) is given.
pub const DEFAULT_INSTANCE_MEMORY_MB: u32 = 2048;
/// Scale-out bound when none (or zero) is given.
pub const DEFAULT_MAXIMUM_INSTANCE_COUNT: u32 = 100;

/// Construction parameters of a [`FunctionAppComponent`](crate::FunctionAppComponent).
#[derive(Clone, Debug)]
pub struct FunctionAppArgs {
    /// The resource group every child is created in.
    pub resource_group_name: Output<String>,
    /// The language runtime.
    pub runtime: Output<FunctionsRuntime>,
    /// Upper bound on scaled-out instances.
    pub maximum_instance_count: Option<u32>,
    /// Memory per instance, in MB.
    pub instance_memory_mb: Option<u32>,
    /// Extra app settings, appended after the defaults in the given order.
    pub app_settings: Option<Output<Vec<NameValuePair>>>,
}

impl FunctionAppArgs {
    /// Creates args with the required parameters; everything else defaults.
    pub fn new(
        resource_group_name: impl Into<Output<String>>,
        runtime: impl Into<Output<FunctionsRuntime>>,
    ) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            runtime: runtime.into(),
            maximum_instance_count: None,
            instance_memory_mb: None,
            app_settings: None,
        }
    }

    /// Sets the scale-out bound.
    pub fn with_maximum_instance_count(mut self, count: u32) -> Self {
        self.maximum_instance_count = Some(count);
        self
    }

    /// Sets the memory per instance.
    pub fn with_instance_memory_mb(mut self, memory_mb: u32) -> Self {
        self.instance_memory_mb = Some(memory_mb);
        self
    }

    /// Sets the extra app settings.
    pub fn with_app_settings(mut self, settings: impl Into<Output<Vec<NameValuePair>>>) -> Self {
        self.app_settings = Some(settings.into());
        self
    }

    /// The scaling bounds to declare. Missing and zero values both fall back
    /// to the defaults.
    pub fn scale_and_concurrency(&self) -> ScaleAndConcurrency {
        ScaleAndConcurrency {
            instance_memory_mb: non_zero_or(self.instance_memory_mb, DEFAULT_INSTANCE_MEMORY_MB),
            maximum_instance_count: non_zero_or(
                self.maximum_instance_count,
                DEFAULT_MAXIMUM_INSTANCE_COUNT,
            ),
        }
    }
}

fn non_zero_or(value: Option<u32>, default: u32) -> u32 {
    value.filter(|v| *v != 0).unwrap_or(default)
}
