mod common;

use common::*;
use ruledex::error::Result;
use ruledex::term::IndexTerm;

#[test]
fn test_scorecards_by_referenced_type() -> Result<()> {
    let store = memory_store()?;

    // 1. One scorecard on applicants and mortgages, one on applicants only
    let both = path("/org/mortgages/both.scgd");
    let applicant_only = path("/org/mortgages/applicant.scgd");
    store.index(
        both.clone(),
        document(
            &both,
            &scorecard("both", &[("Applicant", "age"), ("Mortgage", "amount")]),
        )?,
    )?;
    store.index(
        applicant_only.clone(),
        document(&applicant_only, &scorecard("applicant", &[("Applicant", "age")]))?,
    )?;
    store.refresh()?;

    // 2. Lower-case query values match regardless of how assets spell them
    assert_eq!(
        store.query(&[IndexTerm::type_name("applicant")])?,
        vec![applicant_only.clone(), both.clone()]
    );
    assert_eq!(store.query(&[IndexTerm::type_name("mortgage")])?, vec![both.clone()]);
    assert_eq!(
        store.query(&[IndexTerm::field_type_fqcn("java.lang.integer")])?,
        vec![applicant_only.clone(), both.clone()]
    );

    // 3. Terms combine conjunctively
    assert_eq!(
        store.query(&[
            IndexTerm::type_name("mortgage"),
            IndexTerm::field_type_name("amount"),
        ])?,
        vec![both.clone()]
    );
    assert!(
        store
            .query(&[
                IndexTerm::type_name("applicant"),
                IndexTerm::field_type_name("no_such_field"),
            ])?
            .is_empty()
    );

    Ok(())
}

#[test]
fn test_every_referenced_type_is_queryable() -> Result<()> {
    let store = memory_store()?;
    let card = path("/cards/all.scgd");
    let doc = document(
        &card,
        &scorecard("all", &[("Applicant", "age"), ("Mortgage", "amount")]),
    )?;

    let types: Vec<String> = doc
        .values(ruledex::term::IndexableElement::TypeName)
        .map(str::to_string)
        .collect();
    assert!(!types.is_empty());

    store.index(card.clone(), doc)?;
    store.refresh()?;

    for type_name in types {
        assert_eq!(
            store.query(&[IndexTerm::type_name(type_name.to_lowercase())])?,
            vec![card.clone()],
            "{type_name} should be queryable"
        );
    }
    Ok(())
}

#[test]
fn test_reindex_and_remove() -> Result<()> {
    let store = memory_store()?;
    let card = path("/cards/rates.scgd");

    store.index(
        card.clone(),
        document(
            &card,
            &scorecard("rates", &[("Applicant", "age"), ("Mortgage", "amount")]),
        )?,
    )?;
    store.refresh()?;
    assert_eq!(store.query(&[IndexTerm::type_name("mortgage")])?, vec![card.clone()]);

    // Dropping the mortgage characteristic drops the term
    store.index(
        card.clone(),
        document(&card, &scorecard("rates", &[("Applicant", "age")]))?,
    )?;
    store.refresh()?;
    assert!(store.query(&[IndexTerm::type_name("mortgage")])?.is_empty());
    assert_eq!(store.query(&[IndexTerm::type_name("applicant")])?, vec![card.clone()]);

    store.remove(&card)?;
    store.refresh()?;
    assert!(store.query(&[IndexTerm::type_name("applicant")])?.is_empty());
    assert_eq!(store.doc_count(), 0);

    Ok(())
}

#[test]
fn test_empty_query_matches_nothing() -> Result<()> {
    let store = memory_store()?;
    let card = path("/cards/rates.scgd");
    store.index(
        card.clone(),
        document(&card, &scorecard("rates", &[("Applicant", "age")]))?,
    )?;
    store.refresh()?;

    assert!(store.query(&[])?.is_empty());
    Ok(())
}

#[test]
fn test_scorecards_with_imported_types() -> Result<()> {
    let store = memory_store()?;

    let scorecard1 = path("/indexing/scorecard1.scgd");
    let scorecard2 = path("/indexing/scorecard2.scgd");
    store.index(
        scorecard1.clone(),
        packaged_document(&scorecard1, &packaged_scorecard("scorecard1", true))?,
    )?;
    store.index(
        scorecard2.clone(),
        packaged_document(&scorecard2, &packaged_scorecard("scorecard2", false))?,
    )?;
    store.refresh()?;

    let applicant = IndexTerm::type_name(format!("{INDEXING_CLASSES}.applicant"));
    let mortgage = IndexTerm::type_name(format!("{INDEXING_CLASSES}.mortgage"));
    assert_eq!(
        store.query(&[applicant.clone()])?,
        vec![scorecard1.clone(), scorecard2.clone()]
    );
    assert_eq!(store.query(&[mortgage.clone()])?, vec![scorecard1.clone()]);
    assert_eq!(
        store.query(&[applicant, mortgage, IndexTerm::field_type_name("amount")])?,
        vec![scorecard1.clone()]
    );
    assert_eq!(
        store.query(&[IndexTerm::package_name(INDEXING_PACKAGE)])?,
        vec![scorecard1, scorecard2]
    );

    // Simple names are not indexed for imported types
    assert!(store.query(&[IndexTerm::type_name("applicant")])?.is_empty());
    Ok(())
}
