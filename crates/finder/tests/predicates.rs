#![cfg(test)]
#![allow(
    clippy::missing_panics_doc,
    reason = "Assertions in tests are expected"
)]

mod common;

use common::{Page, TestResult};
use finder::{Finder, FinderOptions};

#[test]
fn attribute_operators_on_a_class_list() -> TestResult {
    let page = Page::new()?;
    let para = page.node("p1")?;
    for options in [FinderOptions::default(), FinderOptions::manual()] {
        let finder = Finder::with_options(&page.doc, options)?;
        assert!(finder.is_match(para, r#"[class~="bar-baz"]"#));
        assert!(!finder.is_match(para, "[class~=bar]"));
        assert!(finder.is_match(para, "[class*=bar]"));
        assert!(finder.is_match(para, "[class^=foo]"));
        assert!(finder.is_match(para, "[class$=baz]"));
        assert!(!finder.is_match(para, "[class|=foo]"));
        assert!(!finder.is_match(para, "[class=foo]"));
        assert!(finder.is_match(para, "[class]"));
        assert!(!finder.is_match(para, "[title]"));
        assert!(!finder.is_match(para, "[title^=x]"));
        assert!(finder.is_match(para, ".foo.bar-baz"));
        assert!(!finder.is_match(para, ".foo.bar"));
    }
    Ok(())
}

#[test]
fn unknown_operator_never_matches() -> TestResult {
    let page = Page::new()?;
    let finder = Finder::new(&page.doc)?;
    assert!(!finder.is_match(page.node("p1")?, "[class!=foo]"));
    assert!(finder.query(None, "p[class!=x]").is_empty());
    Ok(())
}

#[test]
fn dash_match_and_tag_case() -> TestResult {
    let page = Page::new()?;
    for options in [FinderOptions::default(), FinderOptions::manual()] {
        let finder = Finder::with_options(&page.doc, options)?;
        assert_eq!(page.ids(&finder.query(None, "li[lang|=en]")), ["one", "two"]);
        assert_eq!(page.ids(&finder.query(None, "LI#two")), ["two"]);
        assert_eq!(page.ids(&finder.query(None, "#menu > .last")), ["three"]);
    }
    Ok(())
}

#[test]
fn structural_pseudo_classes() -> TestResult {
    let page = Page::new()?;
    for options in [FinderOptions::default(), FinderOptions::manual()] {
        let finder = Finder::with_options(&page.doc, options)?;
        assert_eq!(page.ids(&finder.query(None, "li:first-child")), ["one"]);
        assert_eq!(page.ids(&finder.query(None, "li:last-child")), ["three"]);
        assert!(finder.query(None, "li:only-child").is_empty());
        assert_eq!(page.ids(&finder.query(None, "a:only-child")), ["link"]);
        assert_eq!(page.ids(&finder.query(None, "p:first-of-type")), ["p1"]);
        assert_eq!(page.ids(&finder.query(None, "p:last-of-type")), ["p2"]);
        assert_eq!(page.ids(&finder.query(None, "#outer > :only-of-type")), ["s1", "f"]);
        assert_eq!(page.ids(&finder.query(None, ":root")), ["html"]);
    }
    Ok(())
}

#[test]
fn empty_means_no_elements_and_no_text() -> TestResult {
    let page = Page::new()?;
    for options in [FinderOptions::default(), FinderOptions::manual()] {
        let finder = Finder::with_options(&page.doc, options)?;
        assert_eq!(page.ids(&finder.query(None, "li:empty, span:empty")), ["three", "s1"]);
        assert!(finder.query(None, "p:empty").is_empty());
        assert!(finder.query(None, "option:empty").is_empty());
    }
    Ok(())
}

#[test]
fn form_state_pseudo_classes() -> TestResult {
    let page = Page::new()?;
    for options in [FinderOptions::default(), FinderOptions::manual()] {
        let finder = Finder::with_options(&page.doc, options)?;
        assert_eq!(page.ids(&finder.query(None, "input:checked")), ["i1"]);
        assert_eq!(page.ids(&finder.query(None, ":checked")), ["i1", "o1"]);
        assert_eq!(page.ids(&finder.query(None, "option:selected")), ["o1"]);
        assert_eq!(page.ids(&finder.query(None, ":disabled")), ["i2"]);
        assert_eq!(page.ids(&finder.query(None, "input:enabled")), ["i1"]);
    }
    Ok(())
}

#[test]
fn extended_pseudo_classes() -> TestResult {
    let page = Page::new()?;
    let finder = Finder::new(&page.doc)?;
    assert_eq!(page.ids(&finder.query(None, "li:not(.first)")), ["two", "three"]);
    assert_eq!(page.ids(&finder.query(None, "li:not(.first, #three)")), ["two"]);
    assert_eq!(page.ids(&finder.query(None, "p:contains(world)")), ["p1"]);
    assert_eq!(page.ids(&finder.query(None, r#"li:contains("Tw")"#)), ["two"]);
    assert_eq!(page.ids(&finder.query(None, "li:first-child:contains(One)")), ["one"]);
    Ok(())
}

#[test]
fn every_pseudo_in_a_compound_is_checked() -> TestResult {
    let page = Page::new()?;
    let finder = Finder::with_options(&page.doc, FinderOptions::manual())?;
    let one = page.node("one")?;
    assert!(finder.is_match(one, "li:first-child:not(.last)"));
    assert!(!finder.is_match(one, "li:first-child:last-child"));
    assert!(!finder.is_match(one, "li:first-child:empty"));
    Ok(())
}

#[test]
fn focus_requires_a_focusable_active_element() -> TestResult {
    let page = Page::new()?;
    let finder = Finder::new(&page.doc)?;
    assert!(finder.query(None, ":focus").is_empty());

    page.doc.focus(Some(page.node("link")?));
    assert_eq!(page.ids(&finder.query(None, ":focus")), ["link"]);

    page.doc.focus(Some(page.node("s1")?));
    assert!(finder.query(None, "span:focus").is_empty());

    page.doc.focus(Some(page.node("i1")?));
    assert!(finder.is_match(page.node("i1")?, "input:focus"));
    Ok(())
}

#[test]
fn unknown_pseudo_reads_the_attribute() -> TestResult {
    let page = Page::new()?;
    for options in [FinderOptions::default(), FinderOptions::manual()] {
        let finder = Finder::with_options(&page.doc, options)?;
        assert_eq!(page.ids(&finder.query(None, "li:data-kind(special)")), ["three"]);
        assert_eq!(page.ids(&finder.query(None, "li:lang")), ["one", "two"]);
        assert!(finder.query(None, "li:data-kind(plain)").is_empty());
    }
    Ok(())
}
