#![allow(dead_code)]

use trv::model::{
    FixtureType, Status, TestCase, TestClass, TestFixture, TestGroup, TestSuite,
};

pub fn fixture(fixture_type: FixtureType, full_name: &str, status: Status) -> TestFixture {
    let name = full_name.rsplit('.').next().unwrap_or(full_name);
    TestFixture::new(fixture_type, name, full_name, status)
}

pub fn case(full_name: &str, status: Status) -> TestCase {
    let name = full_name.rsplit('.').next().unwrap_or(full_name);
    TestCase::new(name, full_name, fixture(FixtureType::Test, full_name, status)).unwrap()
}

pub fn passed(full_name: &str) -> TestCase {
    case(full_name, Status::Passed)
}

pub fn failed(full_name: &str) -> TestCase {
    case(full_name, Status::Failed)
}

pub fn skipped(full_name: &str) -> TestCase {
    case(full_name, Status::Skipped)
}

pub fn group(full_name: &str, cases: Vec<TestCase>) -> TestGroup {
    let name = full_name.rsplit('.').next().unwrap_or(full_name);
    TestGroup::new(name, full_name, cases)
}

pub fn class(full_name: &str, groups: Vec<TestGroup>) -> TestClass {
    let name = full_name.rsplit('.').next().unwrap_or(full_name);
    TestClass::new(name, full_name, groups)
}

/// One class, one group, one passed and one failed case.
pub fn two_case_suite() -> TestSuite {
    TestSuite::new(
        "DefaultSuite",
        vec![class(
            "tests.LoginTest",
            vec![group(
                "tests.LoginTest.DEFAULT",
                vec![
                    passed("tests.LoginTest.test_ok"),
                    failed("tests.LoginTest.test_bad"),
                ],
            )],
        )],
    )
}

/// Two classes over three groups with every status and container fixtures.
pub fn mixed_suite() -> TestSuite {
    let login = class(
        "tests.LoginTest",
        vec![
            group(
                "tests.LoginTest.smoke",
                vec![passed("tests.LoginTest.test_ok"), failed("tests.LoginTest.test_bad")],
            )
            .with_before(fixture(
                FixtureType::BeforeGroup,
                "tests.LoginTest.open_browser",
                Status::Passed,
            )),
            group(
                "tests.LoginTest.regression",
                vec![skipped("tests.LoginTest.test_later")],
            ),
        ],
    )
    .with_after(fixture(
        FixtureType::AfterClass,
        "tests.LoginTest.close_browser",
        Status::Failed,
    ));
    let cart = class(
        "tests.CartTest",
        vec![group(
            "tests.CartTest.DEFAULT",
            vec![
                passed("tests.CartTest.test_add"),
                passed("tests.CartTest.test_remove"),
                failed("tests.CartTest.test_checkout"),
            ],
        )],
    );
    TestSuite::new("DefaultSuite", vec![login, cart]).with_before(fixture(
        FixtureType::BeforeSuite,
        "DefaultSuite.start_server",
        Status::Passed,
    ))
}

pub const REPORT_JSON: &str = r#"{
    "type": "testsuite",
    "name": "DefaultSuite",
    "elapsedTime": 3.25,
    "beforeSuite": {
        "type": "testfixture", "fixtureType": "beforeSuite",
        "name": "start_server", "status": "passed"
    },
    "testClasses": [{
        "type": "testclass",
        "name": "LoginTest",
        "fullName": "tests.LoginTest",
        "runMode": "parallel",
        "testGroups": [{
            "type": "testgroup",
            "name": "DEFAULT",
            "fullName": "tests.LoginTest.DEFAULT",
            "testCases": [
                {
                    "type": "testcase",
                    "name": "test_ok",
                    "fullName": "tests.LoginTest.test_ok",
                    "tags": ["smoke", "login", "smoke"],
                    "startTime": "2024-06-01T10:00:00Z",
                    "endTime": "2024-06-01T10:00:01.500Z",
                    "elapsedTime": 1.5,
                    "beforeMethod": {
                        "type": "testfixture", "fixtureType": "beforeMethod", "isEmpty": true
                    },
                    "test": {
                        "type": "testfixture", "fixtureType": "test",
                        "name": "test_ok", "status": "passed"
                    },
                    "afterMethod": {
                        "type": "testfixture", "fixtureType": "afterMethod",
                        "name": "logout", "status": "passed",
                        "logs": [{"level": "info", "message": "logged out"}]
                    }
                },
                {
                    "type": "testcase",
                    "name": "test_bad",
                    "fullName": "tests.LoginTest.test_bad",
                    "test": {
                        "type": "testfixture", "fixtureType": "test",
                        "name": "test_bad", "status": "failed",
                        "screenshot": "shots/test_bad.png",
                        "failureMessage": "expected 200, got 500",
                        "failureType": "AssertionError",
                        "stackTrace": "at test_bad (login.py:42)"
                    }
                }
            ]
        }]
    }]
}"#;
