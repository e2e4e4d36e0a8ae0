/// How WebDriver should locate an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    Css(&'static str),
    XPath(&'static str),
}

impl Locator {
    /// The W3C `using` strategy name.
    pub fn strategy(&self) -> &'static str {
        match self {
            Locator::Css(_) => "css selector",
            Locator::XPath(_) => "xpath",
        }
    }

    pub fn value(&self) -> &'static str {
        match self {
            Locator::Css(v) | Locator::XPath(v) => v,
        }
    }
}

pub const PROFILE_LINKS: Locator = Locator::XPath(r#"//a[contains(@href, "/in/")]"#);

pub const NAME: Locator = Locator::Css("main h1");

pub const HEADLINE: Locator = Locator::Css("div.text-body-medium.break-words");

pub const DESIGNATION: Locator = Locator::XPath(
    r#"//*[@id="profile-content"]/div/div[2]/div/div/main/section[4]/div[3]/ul/li[1]/div/div[2]/div[1]/a/div/div/div/div/span[1]"#,
);

pub const COMPANY: Locator = Locator::XPath(
    r#"//*[@id="profile-content"]/div/div[2]/div/div/main/section[4]/div[3]/ul/li[1]/div/div[2]/div[1]/a/span[1]/span[1]"#,
);

/// Experience section on a profile page.
pub const EXPERIENCE: Locator = Locator::Css(".experience-section");

/// Skills section on a profile page, one skill per line.
pub const SKILLS: Locator = Locator::Css("#skills-section");

// Relative to a result link: the enclosing result card's subtitles.
pub const CARD_TITLE: Locator = Locator::XPath(
    r#"./ancestor::li[1]//*[contains(@class, "entity-result__primary-subtitle")]"#,
);

pub const CARD_SUMMARY: Locator = Locator::XPath(
    r#"./ancestor::li[1]//*[contains(@class, "entity-result__secondary-subtitle")]"#,
);
