use std::collections::HashSet;

use flexfn_azure::web::NameValuePair;
use flexfn_output::Output;

/// The app setting that points the Functions host at its storage account by
/// name, so it authenticates with the app's identity instead of a key.
pub const STORAGE_ACCOUNT_NAME_SETTING: &str = "AzureWebJobsStorage__accountName";

/// The settings every function app gets, resolved once the account is named.
pub fn default_app_settings(storage_account_name: Output<String>) -> Output<Vec<NameValuePair>> {
    storage_account_name.map(|name| vec![NameValuePair::new(STORAGE_ACCOUNT_NAME_SETTING, name)])
}

/// Defaults first, then `custom` in its own order.
///
/// Names are not deduplicated: a caller setting with a default's name is
/// passed through after it, and a warning is logged when the list resolves.
pub fn merge_app_settings(
    defaults: Output<Vec<NameValuePair>>,
    custom: Option<Output<Vec<NameValuePair>>>,
) -> Output<Vec<NameValuePair>> {
    let Some(custom) = custom else {
        return defaults;
    };
    defaults.zip(custom).map(|(mut merged, custom)| {
        merged.extend(custom);
        warn_on_duplicates(&merged);
        merged
    })
}

/// Names that repeat an earlier entry, once per repetition, in list order.
pub fn duplicate_names(settings: &[NameValuePair]) -> Vec<&str> {
    let mut seen = HashSet::new();
    settings
        .iter()
        .map(|setting| setting.name.as_str())
        .filter(|name| !seen.insert(*name))
        .collect()
}

fn warn_on_duplicates(settings: &[NameValuePair]) {
    for name in duplicate_names(settings) {
        tracing::warn!(%name, "App setting is declared more than once");
    }
}
