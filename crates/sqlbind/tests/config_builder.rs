// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Root configuration document integration tests.

mod common;

use common::TestDriver;
use sqlbind::builder::XmlConfigBuilder;
use sqlbind::error::BuilderError;
use sqlbind::mapping::TransactionManagerKind;
use sqlbind::schema::{TypeDef, TypeSchema};
use sqlbind::{Properties, TypeRef};
use std::io::Write;
use std::sync::Arc;

fn builder() -> XmlConfigBuilder {
    XmlConfigBuilder::new(Arc::new(TypeSchema::new()))
}

#[test]
fn test_minimal_document() {
    let config = builder().parse("<configuration></configuration>").unwrap();
    assert!(config.environment().is_none());
    assert!(config.settings().cache_enabled);
}

#[test]
fn test_section_order_is_mandatory() {
    let err = builder()
        .parse(
            r#"<configuration>
                 <settings/>
                 <properties/>
               </configuration>"#,
        )
        .unwrap_err();
    assert!(matches!(err, BuilderError::Section { .. }));

    let err = builder()
        .parse("<configuration><surprise/></configuration>")
        .unwrap_err();
    assert!(matches!(err, BuilderError::Section { .. }));
}

#[test]
fn test_unknown_setting_aborts() {
    let err = builder()
        .parse(
            r#"<configuration>
                 <settings>
                   <setting name="cacheEnabled" value="true"/>
                   <setting name="totallyUnknown" value="1"/>
                 </settings>
               </configuration>"#,
        )
        .unwrap_err();
    assert!(matches!(err, BuilderError::UnknownSetting { .. }));
}

#[test]
fn test_settings_applied() {
    let config = builder()
        .parse(
            r#"<configuration>
                 <settings>
                   <setting name="mapUnderscoreToCamelCase" value="true"/>
                   <setting name="defaultExecutorType" value="REUSE"/>
                   <setting name="defaultStatementTimeout" value="30"/>
                 </settings>
               </configuration>"#,
        )
        .unwrap();
    assert!(config.settings().map_underscore_to_camel_case);
    assert_eq!(config.settings().default_statement_timeout, Some(30));
}

#[test]
fn test_properties_merge_precedence() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "from.file=file-value").unwrap();
    writeln!(file, "shared=file-wins-over-nested").unwrap();
    let path = file.path().to_str().unwrap();

    let mut caller = Properties::new();
    caller.insert("from.caller".to_string(), "caller-value".to_string());
    caller.insert("shared".to_string(), "caller-wins".to_string());

    let xml = format!(
        r#"<configuration>
             <properties resource="{}">
               <property name="from.nested" value="nested-value"/>
               <property name="shared" value="nested-value"/>
             </properties>
           </configuration>"#,
        path
    );
    let config = builder().with_variables(caller).parse(&xml).unwrap();
    let vars = config.variables();
    assert_eq!(vars.get("from.nested").map(String::as_str), Some("nested-value"));
    assert_eq!(vars.get("from.file").map(String::as_str), Some("file-value"));
    assert_eq!(vars.get("from.caller").map(String::as_str), Some("caller-value"));
    assert_eq!(vars.get("shared").map(String::as_str), Some("caller-wins"));
}

#[test]
fn test_properties_resource_and_url_exclusive() {
    let err = builder()
        .parse(
            r#"<configuration>
                 <properties resource="a.properties" url="file:///b.properties"/>
               </configuration>"#,
        )
        .unwrap_err();
    assert!(matches!(err, BuilderError::ExclusiveAttributes { .. }));
}

#[test]
fn test_type_aliases_section() {
    let schema = Arc::new(TypeSchema::new());
    schema.register(TypeDef::class("app.model.Blog"));
    schema.register(TypeDef::class("app.model.Post"));
    let config = XmlConfigBuilder::new(schema)
        .parse(
            r#"<configuration>
                 <typeAliases>
                   <typeAlias alias="blog" type="app.model.Blog"/>
                   <package name="app.model"/>
                 </typeAliases>
               </configuration>"#,
        )
        .unwrap();
    assert_eq!(
        config.type_aliases().resolve("BLOG").unwrap(),
        TypeRef::concrete("app.model.Blog")
    );
    assert_eq!(
        config.type_aliases().resolve("post").unwrap(),
        TypeRef::concrete("app.model.Post")
    );
}

#[test]
fn test_environment_and_database_id_provider() {
    let mut builder = builder();
    builder
        .config_mut()
        .drivers()
        .register("test", Arc::new(TestDriver::new("TestDB Server 9.4")));
    let config = builder
        .parse(
            r#"<configuration>
                 <environments default="dev">
                   <environment id="prod">
                     <transactionManager type="MANAGED"/>
                     <dataSource type="UNPOOLED">
                       <property name="driver" value="test"/>
                       <property name="url" value="test:prod"/>
                     </dataSource>
                   </environment>
                   <environment id="dev">
                     <transactionManager type="JDBC"/>
                     <dataSource type="POOLED">
                       <property name="driver" value="test"/>
                       <property name="url" value="test:dev"/>
                       <property name="username" value="app"/>
                       <property name="poolMaximumActiveConnections" value="4"/>
                     </dataSource>
                   </environment>
                 </environments>
                 <databaseIdProvider type="DB_VENDOR">
                   <property name="TestDB" value="testdb"/>
                   <property name="OtherDB" value="other"/>
                 </databaseIdProvider>
               </configuration>"#,
        )
        .unwrap();
    let environment = config.environment().unwrap();
    assert_eq!(environment.id(), "dev");
    assert_eq!(environment.transaction_manager(), TransactionManagerKind::Jdbc);
    assert_eq!(config.database_id(), Some("testdb"));

    // the configured data source hands out live connections
    let mut conn = environment.data_source().connection().unwrap();
    conn.execute("select 1").unwrap();
    conn.close().unwrap();
}

#[test]
fn test_unknown_datasource_type_rejected() {
    let mut b = builder();
    b.config_mut()
        .drivers()
        .register("test", Arc::new(TestDriver::new("TestDB")));
    let err = b
        .parse(
            r#"<configuration>
                 <environments default="dev">
                   <environment id="dev">
                     <transactionManager type="JDBC"/>
                     <dataSource type="CLUSTERED">
                       <property name="driver" value="test"/>
                       <property name="url" value="test:x"/>
                     </dataSource>
                   </environment>
                 </environments>
               </configuration>"#,
        )
        .unwrap_err();
    assert!(matches!(err, BuilderError::UnknownProvider { .. }));
}

#[test]
fn test_mapper_resource_loading() {
    let mut mapper_file = tempfile::NamedTempFile::new().unwrap();
    write!(
        mapper_file,
        r#"<mapper namespace="app.UserMapper">
             <select id="selectUser" resultType="map">select * from users where id = #{{id}}</select>
           </mapper>"#
    )
    .unwrap();
    let path = mapper_file.path().to_str().unwrap();
    let xml = format!(
        r#"<configuration>
             <mappers>
               <mapper resource="{}"/>
             </mappers>
           </configuration>"#,
        path
    );
    let config = builder().parse(&xml).unwrap();
    let statement = config.mapped_statement("app.UserMapper.selectUser").unwrap();
    let bound = statement.bound_sql(&sqlbind::Value::Null);
    assert_eq!(bound.sql, "select * from users where id = ?");
    assert_eq!(bound.parameter_mappings[0].property, "id");
}
