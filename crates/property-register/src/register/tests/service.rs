use super::common::*;
use crate::register::domain::{
    FamilyStatus, OwnerId, OwnerUpdate, PropertyId, PropertyType, PropertyUpdate,
};
use crate::register::repository::{OwnerRepository, RepositoryError};
use crate::register::assessment::TaxAssessor;
use crate::register::memory::InMemoryOwnerRepository;
use crate::register::rates::TaxRateTable;
use crate::register::service::{OwnerService, OwnerServiceError};
use rust_decimal::Decimal;
use std::sync::Arc;

fn update_for(first_name: &str, family_status: FamilyStatus) -> OwnerUpdate {
    OwnerUpdate {
        first_name: first_name.to_string(),
        last_name: "Faith".to_string(),
        age: 31,
        family_status,
        has_children: false,
        email: "johnfaith@gmail.com".to_string(),
        phone_number: "+456987123".to_string(),
        birthday: date(1994, 8, 9),
    }
}

#[test]
fn add_owner_assigns_ids_from_storage() {
    let (register, _, _) = build_register();
    let first = register
        .owners
        .add_owner(new_owner("John", FamilyStatus::Single, false, "0", vec![flat(), house()]))
        .expect("first owner saved");
    let second = register
        .owners
        .add_owner(new_owner("Linda", FamilyStatus::Married, true, "0", vec![house()]))
        .expect("second owner saved");

    assert_ne!(first.id, second.id);
    let mut property_ids: Vec<PropertyId> = first
        .properties
        .iter()
        .chain(&second.properties)
        .map(|property| property.id)
        .collect();
    property_ids.dedup();
    assert_eq!(property_ids.len(), 3);
    assert_eq!(register.owners.all_owners().expect("owners").len(), 2);
    assert_eq!(
        register.owners.owner_by_id(first.id).expect("stored"),
        first
    );
}

#[test]
fn owner_lookup_reports_missing_owner() {
    let (register, _, _) = build_register();
    match register.owners.owner_by_id(OwnerId(1)) {
        Err(OwnerServiceError::Repository(RepositoryError::NoSuchOwner(OwnerId(1)))) => {}
        other => panic!("expected missing owner, got {other:?}"),
    }
}

#[test]
fn add_owner_rejects_invalid_data() {
    let (register, _, _) = build_register();

    let negative = new_owner("John", FamilyStatus::Single, false, "-1", vec![flat()]);
    assert!(matches!(
        register.owners.add_owner(negative),
        Err(OwnerServiceError::Validation(_))
    ));

    let mut empty_flat = flat();
    empty_flat.area = Decimal::ZERO;
    let zero_area = new_owner("John", FamilyStatus::Single, false, "0", vec![empty_flat]);
    assert!(matches!(
        register.owners.add_owner(zero_area),
        Err(OwnerServiceError::Validation(_))
    ));
    assert!(register.owners.all_owners().expect("owners").is_empty());
}

#[test]
fn update_info_replaces_details_but_keeps_debt_and_properties() {
    let (register, _, _) = build_register();
    let owner = register
        .owners
        .add_owner(new_owner("John", FamilyStatus::Single, false, "150", vec![flat()]))
        .expect("owner saved");

    let updated = register
        .owners
        .update_info(owner.id, update_for("John", FamilyStatus::Married))
        .expect("update succeeds");

    assert_eq!(updated.last_name, "Faith");
    assert_eq!(updated.family_status, FamilyStatus::Married);
    assert_eq!(updated.taxes_debt, Decimal::from(150));
    assert_eq!(updated.properties, owner.properties);
    assert_eq!(
        register.owners.count_tax_obligation(owner.id).expect("obligation"),
        dec("378.0")
    );
}

#[test]
fn update_info_keeps_property_added_by_another_writer() {
    let repository = Arc::new(InterleavedRepository {
        before_update: Some(Box::new(|inner: &InMemoryOwnerRepository, id: OwnerId| {
            inner.save_property(id, house()).expect("concurrent property saved");
        })),
        ..InterleavedRepository::default()
    });
    let owner = repository
        .save(new_owner("John", FamilyStatus::Single, false, "250", vec![flat()]))
        .expect("owner saved");
    let service = OwnerService::new(
        repository.clone(),
        Arc::new(TaxRateTable::seeded()),
        TaxAssessor::default(),
    );

    let updated = service
        .update_info(owner.id, update_for("John", FamilyStatus::Married))
        .expect("update succeeds");

    assert_eq!(updated.family_status, FamilyStatus::Married);
    assert_eq!(updated.properties.len(), 2);
    assert_eq!(updated.taxes_debt, Decimal::from(250));
    let stored = repository.find_by_id(owner.id).expect("owner stored");
    assert_eq!(stored.properties.len(), 2);
}

#[test]
fn update_info_fails_for_unknown_owner() {
    let (register, _, _) = build_register();
    assert!(matches!(
        register
            .owners
            .update_info(OwnerId(7), update_for("John", FamilyStatus::Single)),
        Err(OwnerServiceError::UpdateFailed(_))
    ));
}

#[test]
fn remove_owner_reports_whether_anything_was_removed() {
    let (register, _, _) = build_register();
    let owner = register
        .owners
        .add_owner(new_owner("John", FamilyStatus::Single, false, "0", vec![flat()]))
        .expect("owner saved");

    assert!(register.owners.remove_owner(owner.id).expect("remove"));
    assert!(!register.owners.remove_owner(owner.id).expect("second remove"));
    assert!(register.owners.all_owners().expect("owners").is_empty());
}

#[test]
fn find_debtors_filters_positive_balances() {
    let (register, _, _) = build_register();
    register
        .owners
        .add_owner(new_owner("John", FamilyStatus::Single, false, "0", vec![flat()]))
        .expect("owner saved");
    let debtor = register
        .owners
        .add_owner(new_owner("Frank", FamilyStatus::Single, false, "10000", vec![large_house()]))
        .expect("debtor saved");

    assert_eq!(register.owners.find_debtors().expect("debtors"), vec![debtor]);
}

#[test]
fn count_tax_obligation_uses_current_rates() {
    let (register, _, _) = build_register();
    let owner = register
        .owners
        .add_owner(new_owner("John", FamilyStatus::Single, false, "0", vec![flat()]))
        .expect("owner saved");

    assert_eq!(
        register.owners.count_tax_obligation(owner.id).expect("obligation"),
        Decimal::from(420)
    );
    register.rates.change_tax(PropertyType::Flat, Decimal::from(7));
    assert_eq!(
        register.owners.count_tax_obligation(owner.id).expect("obligation"),
        Decimal::from(490)
    );
}

#[test]
fn property_lifecycle_mutates_only_numeric_fields() {
    let (register, repository, _) = build_register();
    let owner = register
        .owners
        .add_owner(new_owner("John", FamilyStatus::Single, false, "0", Vec::new()))
        .expect("owner saved");

    let property = register
        .owners
        .add_property(owner.id, office())
        .expect("property saved");
    register
        .owners
        .update_property(
            owner.id,
            property.id,
            PropertyUpdate {
                number_of_rooms: Some(12),
                cost: Some(Decimal::from(1_200_000)),
                date_of_becoming_owner: Some(date(2024, 2, 1)),
                ..PropertyUpdate::default()
            },
        )
        .expect("update succeeds");

    let stored = register.owners.properties(owner.id).expect("properties");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].number_of_rooms, 12);
    assert_eq!(stored[0].cost, Decimal::from(1_200_000));
    assert_eq!(stored[0].date_of_becoming_owner, date(2024, 2, 1));
    assert_eq!(stored[0].address, property.address);
    assert_eq!(stored[0].property_type, PropertyType::Office);

    assert!(register
        .owners
        .remove_property(owner.id, property.id)
        .expect("remove"));
    assert!(repository
        .find_by_id(owner.id)
        .expect("owner")
        .properties
        .is_empty());
}

#[test]
fn property_update_fails_for_missing_targets() {
    let (register, _, _) = build_register();
    let owner = register
        .owners
        .add_owner(new_owner("John", FamilyStatus::Single, false, "0", vec![flat()]))
        .expect("owner saved");

    let missing_property = register.owners.update_property(
        owner.id,
        PropertyId(999),
        PropertyUpdate::default(),
    );
    assert!(matches!(
        missing_property,
        Err(OwnerServiceError::UpdateFailed(_))
    ));

    let missing_owner =
        register
            .owners
            .update_property(OwnerId(999), PropertyId(1), PropertyUpdate::default());
    assert!(matches!(missing_owner, Err(OwnerServiceError::UpdateFailed(_))));

    assert!(matches!(
        register.owners.properties(OwnerId(999)),
        Err(OwnerServiceError::Repository(RepositoryError::NoSuchOwner(_)))
    ));
}
