use std::fmt;

#[derive(Debug, Default, Builder)]
#[builder(default)]
pub struct BuildLocator<'a> {
    #[builder(setter(into, strip_option))]
    build_type: Option<&'a str>,
    #[builder(setter(strip_option))]
    running: Option<bool>,
    /// adds `branch:(default:any)`, otherwise TeamCity only looks at the default branch
    any_branch: bool,
    #[builder(setter(into, strip_option))]
    status: Option<&'a str>,
    #[builder(setter(into, strip_option))]
    state: Option<&'a str>,
    #[builder(setter(into, strip_option))]
    number: Option<&'a str>,
}

impl<'a> fmt::Display for BuildLocator<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut locators: Vec<String> = Vec::new();

        if let Some(build_type) = &self.build_type {
            locators.push(format!("buildType:{build_type}"));
        }

        if let Some(running) = self.running {
            locators.push(format!("running:{running}"));
        }

        if self.any_branch {
            locators.push("branch:(default:any)".to_string());
        }

        if let Some(status) = &self.status {
            locators.push(format!("status:{status}"));
        }

        if let Some(state) = &self.state {
            locators.push(format!("state:{state}"));
        }

        if let Some(number) = &self.number {
            locators.push(format!("number:{number}"));
        }

        write!(f, "{}", locators.join(","))
    }
}
