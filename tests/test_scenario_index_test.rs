mod common;

use common::*;
use ruledex::error::Result;
use ruledex::term::IndexTerm;

#[test]
fn test_scenarios_by_referenced_type() -> Result<()> {
    let store = memory_store()?;

    let with_mortgage = path("/org/mortgages/with_mortgage.scenario");
    let applicant_only = path("/org/mortgages/applicant_only.scenario");
    store.index(
        with_mortgage.clone(),
        document(&with_mortgage, &scenario("with mortgage", true))?,
    )?;
    store.index(
        applicant_only.clone(),
        document(&applicant_only, &scenario("applicant only", false))?,
    )?;
    store.refresh()?;

    assert_eq!(
        store.query(&[IndexTerm::type_name("applicant")])?,
        vec![applicant_only.clone(), with_mortgage.clone()]
    );
    assert_eq!(
        store.query(&[IndexTerm::type_name("mortgage")])?,
        vec![with_mortgage.clone()]
    );
    // Field classes count as referenced types
    assert_eq!(
        store.query(&[IndexTerm::type_name("java.lang.integer")])?,
        vec![applicant_only.clone(), with_mortgage.clone()]
    );
    assert_eq!(
        store.query(&[
            IndexTerm::type_name("mortgage"),
            IndexTerm::field_type_name("amount"),
        ])?,
        vec![with_mortgage.clone()]
    );
    assert_eq!(
        store.query(&[IndexTerm::rule_name("APPROVE")])?,
        vec![applicant_only, with_mortgage]
    );

    Ok(())
}

#[test]
fn test_mixed_asset_kinds() -> Result<()> {
    let store = memory_store()?;

    let card = path("/org/mortgages/rates.scgd");
    let test = path("/org/mortgages/rates.scenario");
    let rule = path("/org/mortgages/approve.rdrl");
    store.index(card.clone(), document(&card, &scorecard("rates", &[("Mortgage", "amount")]))?)?;
    store.index(test.clone(), document(&test, &scenario("rates", true))?)?;
    store.index(
        rule.clone(),
        document(&rule, &guided_rule("approve", &[("no-loop", "true")]))?,
    )?;
    store.refresh()?;

    assert_eq!(
        store.query(&[IndexTerm::type_name("mortgage")])?,
        vec![test.clone(), card.clone()]
    );
    assert_eq!(store.query(&[IndexTerm::rule_name("approve")])?, vec![rule.clone(), test]);

    let stats = store.stats();
    assert_eq!(stats.doc_count, 3);
    assert_eq!(stats.documents_by_type.get("scorecard"), Some(&1));
    assert_eq!(stats.documents_by_type.get("test_scenario"), Some(&1));
    assert_eq!(stats.documents_by_type.get("guided_rule"), Some(&1));

    Ok(())
}

#[test]
fn test_rule_attribute_name_is_not_split() -> Result<()> {
    let store = memory_store()?;

    let rule = path("/org/mortgages/approve.rdrl");
    let other = path("/org/mortgages/loop.rdrl");
    store.index(
        rule.clone(),
        document(&rule, &guided_rule("approve", &[("no-loop", "true")]))?,
    )?;
    store.index(
        other.clone(),
        document(&other, &guided_rule("loop", &[("lock-on-active", "true")]))?,
    )?;
    store.refresh()?;

    assert_eq!(
        store.query(&[IndexTerm::rule_attribute_name("no-loop")])?,
        vec![rule.clone()]
    );
    assert_eq!(
        store.query(&[IndexTerm::rule_attribute_name("No-Loop")])?,
        vec![rule]
    );
    assert!(store.query(&[IndexTerm::rule_attribute_name("no")])?.is_empty());
    assert!(store.query(&[IndexTerm::rule_attribute_name("loop")])?.is_empty());

    Ok(())
}

#[test]
fn test_scenarios_with_imported_types() -> Result<()> {
    let store = memory_store()?;

    let scenario1 = path("/indexing/scenario1.scenario");
    let scenario2 = path("/indexing/scenario2.scenario");
    store.index(
        scenario1.clone(),
        packaged_document(&scenario1, &packaged_scenario("scenario1", true))?,
    )?;
    store.index(
        scenario2.clone(),
        packaged_document(&scenario2, &packaged_scenario("scenario2", false))?,
    )?;
    store.refresh()?;

    assert_eq!(
        store.query(&[IndexTerm::type_name(format!("{INDEXING_CLASSES}.applicant"))])?,
        vec![scenario1.clone(), scenario2]
    );
    assert_eq!(
        store.query(&[IndexTerm::type_name(format!("{INDEXING_CLASSES}.mortgage"))])?,
        vec![scenario1]
    );
    assert!(store.query(&[IndexTerm::type_name("mortgage")])?.is_empty());
    Ok(())
}
