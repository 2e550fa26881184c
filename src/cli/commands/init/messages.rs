//! User-facing text of the init dialog.
//!
//! External harnesses compare the error channel byte for byte, so every
//! string here is fixed, including trailing spaces and blank lines.

pub const WELCOME: &str = "Welcome! This command will take you through the configuration of gcloud.\n\n";

pub const PICK_CONFIGURATION: &str = "Pick configuration to use:";
pub const CREATE_CONFIGURATION_CHOICE: &str = "Create a new configuration";
pub const ENTER_CONFIGURATION_NAME: &str = "Enter configuration name. Names start with a lower case letter and contain only lower case letters a-z, digits 0-9, and hyphens '-':  ";

pub const SKIP_DIAGNOSTICS_HINT: &str =
    "You can skip diagnostics next time by using the following flag:\n  gcloud init --skip-diagnostics\n\n";
pub const NETWORK_ERRORS: &str = "Network errors detected.";
pub const CONTINUE_ANYWAY: &str = "Would you like to continue anyway";
pub const RERUN_DIAGNOSTICS_HINT: &str =
    "You can re-run diagnostics with the following command:\n  gcloud info --run-diagnostics\n\n";

pub const MUST_LOG_IN: &str = "You must log in to continue. Would you like to log in";
pub const CHOOSE_ACCOUNT: &str =
    "Choose the account you would like to use to perform operations for this configuration:";
pub const NEW_ACCOUNT_CHOICE: &str = "Log in with a new account";

pub const PICK_PROJECT: &str = "Pick cloud project to use: ";
pub const CREATE_PROJECT_CHOICE: &str = "Create a new project";
pub const NO_PROJECTS: &str = "This account has no projects.";
pub const CREATE_ONE: &str = "Would you like to create one?";
pub const CREATE_IT: &str = "Would you like to create it?";
pub const ENTER_PROJECT_ID: &str = "Enter a Project ID. Note that a Project ID CANNOT be changed later.\nProject IDs must be 6-30 characters (lowercase ASCII, digits, or\nhyphens) in length and start with a lowercase letter. ";
pub const ENTER_ANY_PROJECT_ID: &str = "Enter project id you would like to use:  ";
pub const ENTER_EXISTING_PROJECT_ID: &str = "Enter an existing project id you would like to use:  ";
pub const MANY_PROJECTS: &str = "This account has a lot of projects! Listing them all can take a while.";
pub const ENTER_PROJECT_ID_CHOICE: &str = "Enter a project ID";
pub const LIST_PROJECTS_CHOICE: &str = "List projects";
pub const INACTIVE_PROJECT: &str =
    "Project ID does not exist or is not active. Please enter an existing and active Project ID.\n";

pub const CONFIGURE_COMPUTE: &str = "Do you want to configure a default Compute Region and Zone?";
pub const COMPUTE_UNAVAILABLE: &str = "Not setting default zone/region (this feature makes it easier to use\n\
[gcloud compute] by setting an appropriate default value for the\n\
--zone and --region flag).\n\
See https://cloud.google.com/compute/docs/gcloud-compute section on how to set\n\
default compute region and zone manually. If you would like [gcloud init] to be\n\
able to do this for you the next time you run it, make sure the\n\
Compute Engine API is enabled for your project on the\n\
https://console.developers.google.com/apis page.\n\n";

pub const BOTO_FAILED: &str = "Error creating a default .boto configuration file. Please run [gsutil config -n] if you would like to create this file.\n";

pub const DISABLED_PROMPTS_ARGUMENT: &str = "disable_prompts/--quiet";
pub const DISABLED_PROMPTS: &str = "gcloud init command cannot run with disabled prompts.";
pub const POSITIONAL_REMOVED: &str = "`gcloud init` has changed and no longer takes a PROJECT argument. Please use `gcloud source repos clone` to clone this project's source repositories.";

pub fn current_settings(name: &str, dump: &str) -> String {
    format!("Settings from your current configuration [{}] are:\n{}\n", name, dump)
}

pub fn reinitialize_choice(name: &str) -> String {
    format!("Re-initialize this configuration [{}] with new settings ", name)
}

pub fn switch_choice(name: &str) -> String {
    format!("Switch to and re-initialize existing configuration: [{}]", name)
}

pub fn current_configuration(name: &str) -> String {
    format!("Your current configuration has been set to: [{}]\n\n", name)
}

pub fn not_credentialed(account: &str, available: &[String]) -> String {
    if available.is_empty() {
        format!("\n[{}] is not a credentialed account.\n", account)
    } else {
        format!(
            "\n[{}] is not one of your credentialed accounts [{}].\n",
            account,
            available.join(",")
        )
    }
}

pub fn logged_in_as(account: &str) -> String {
    format!("You are logged in as: [{}].\n\n", account)
}

pub fn not_your_project(project: &str, projects: &[String]) -> String {
    format!("[{}] is not one of your projects [{}]. ", project, projects.join(","))
}

pub fn not_an_active_project(project: &str) -> String {
    format!("[{}] does not exist or is not active. ", project)
}

pub fn listing_failed(error: &str) -> String {
    format!("Listing available projects failed: {}", error)
}

pub fn project_creation_failed(project: &str, error: &str) -> String {
    format!(
        "Project creation failed: {error}\n\
         Please make sure to create the project [{project}] using\n    \
         $ gcloud projects create {project}\n\
         or change to another project using\n    \
         $ gcloud config set project <PROJECT ID>"
    )
}

pub fn project_operation_failed(project: &str, error: &str) -> String {
    format!("Project creation for project [{}] failed:\n  {}", project, error)
}

pub fn current_project(project: &str) -> String {
    format!("Your current project has been set to: [{}].\n\n", project)
}

pub fn pick_location(kind: &str) -> String {
    format!(
        "Which Google Compute Engine {kind} would you like to use as project default?\n\
         If you do not specify a {kind} via a command line flag while working with Compute Engine resources, the default is assumed."
    )
}

pub fn skip_location_choice(kind: &str) -> String {
    format!("Do not set default {}", kind)
}

pub fn location_set(kind: &str, value: &str) -> String {
    format!(
        "Your project default Compute Engine {kind} has been set to [{value}].\n\
         You can change it by running [gcloud config set compute/{kind} NAME].\n\n"
    )
}

pub fn boto_created(path: &str) -> String {
    format!(
        "Created a default .boto configuration file at [{}]. See this file and\n\
         [https://cloud.google.com/storage/docs/gsutil/commands/config] for more\n\
         information about configuring Google Cloud Storage.\n",
        path
    )
}

/// Closing banner naming everything the run configured.
pub fn ready_to_use(
    configuration: &str,
    account: &str,
    project: &str,
    region: Option<&str>,
    zone: Option<&str>,
) -> String {
    let mut text = format!(
        "Your Google Cloud SDK is configured and ready to use!\n\n\
         * Commands that require authentication will use {} by default\n\
         * Commands will reference project `{}` by default\n",
        account, project
    );
    if let Some(region) = region {
        text.push_str(&format!(
            "* Compute Engine commands will use region `{}` by default\n",
            region
        ));
    }
    if let Some(zone) = zone {
        text.push_str(&format!(
            "* Compute Engine commands will use zone `{}` by default\n\n",
            zone
        ));
    }
    text.push_str(&format!(
        "Run `gcloud help config` to learn how to change individual settings\n\n\
         This gcloud configuration is called [{}]. You can create additional configurations if you work with multiple accounts and/or projects.\n\
         Run `gcloud topic configurations` to learn more.\n\n\
         Some things to try next:\n\n\
         * Run `gcloud --help` to see the Cloud Platform services you can interact with. And run `gcloud help COMMAND` to get help on any gcloud command.\n\
         * Run `gcloud topic --help` to learn about advanced features of the SDK like arg files and output formatting\n",
        configuration
    ));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_failure_guidance() {
        assert_eq!(
            project_creation_failed("taken-project", "HTTPError 409: Message."),
            "Project creation failed: HTTPError 409: Message.\n\
             Please make sure to create the project [taken-project] using\n\
             \x20   $ gcloud projects create taken-project\n\
             or change to another project using\n\
             \x20   $ gcloud config set project <PROJECT ID>"
        );
    }

    #[test]
    fn test_ready_banner_without_compute() {
        let banner = ready_to_use("default", "foo@google.com", "golden-project", None, None);

        assert!(banner.starts_with(
            "Your Google Cloud SDK is configured and ready to use!\n\n\
             * Commands that require authentication will use foo@google.com by default\n\
             * Commands will reference project `golden-project` by default\n\
             Run `gcloud help config`"
        ));
        assert!(banner.contains("This gcloud configuration is called [default]."));
        assert!(banner.ends_with("like arg files and output formatting\n"));
    }

    #[test]
    fn test_ready_banner_with_compute() {
        let banner = ready_to_use("default", "a@b", "p", Some("bad-region"), Some("good-zone"));

        assert!(banner.contains(
            "* Compute Engine commands will use region `bad-region` by default\n\
             * Compute Engine commands will use zone `good-zone` by default\n\n\
             Run `gcloud help config`"
        ));
    }

    #[test]
    fn test_compute_notice_is_one_block() {
        assert!(COMPUTE_UNAVAILABLE.starts_with("Not setting default zone/region (this feature makes it easier to use\n[gcloud compute]"));
        assert!(COMPUTE_UNAVAILABLE.ends_with("https://console.developers.google.com/apis page.\n\n"));
    }
}
