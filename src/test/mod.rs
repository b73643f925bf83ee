//! Shared test factories.
//!
//! `ClassBytesBuilder` encodes class files by hand, without going through the builders, so
//! reader tests do not depend on the code they are checking.

use crate::{file::io::write_be, model::CLASS_MAGIC, pool::ConstantPoolBuilder};

/// Hand encoder for small class files.
pub struct ClassBytesBuilder {
    pool: ConstantPoolBuilder,
    version: (u16, u16),
    flags: u16,
    this_class: u16,
    superclass: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}

impl ClassBytesBuilder {
    /// Public class `name` extending `java/lang/Object`, version 65.0.
    pub fn new(name: &str) -> Self {
        let mut pool = ConstantPoolBuilder::new();
        let this_class = pool.class_entry(name).unwrap().index();
        let superclass = pool.class_entry("java/lang/Object").unwrap().index();
        ClassBytesBuilder {
            pool,
            version: (65, 0),
            flags: 0x0021,
            this_class,
            superclass,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.version = (major, minor);
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        let index = self.pool.class_entry(name).unwrap().index();
        self.interfaces.push(index);
        self
    }

    pub fn field(mut self, flags: u16, name: &str, descriptor: &str, attributes: &[(&str, &[u8])]) -> Self {
        let member = self.member(flags, name, descriptor, attributes);
        self.fields.push(member);
        self
    }

    pub fn method(mut self, flags: u16, name: &str, descriptor: &str, attributes: &[(&str, &[u8])]) -> Self {
        let member = self.member(flags, name, descriptor, attributes);
        self.methods.push(member);
        self
    }

    pub fn class_attribute(mut self, name: &str, payload: &[u8]) -> Self {
        let attribute = self.attribute(name, payload);
        self.attributes.push(attribute);
        self
    }

    /// Writes `index` as `this_class` instead of the class entry.
    pub fn this_class_index_override(mut self, index: u16) -> Self {
        self.this_class = index;
        self
    }

    pub fn utf8_index(&mut self, value: &str) -> u16 {
        self.pool.utf8_entry(value).unwrap().index()
    }

    pub fn method_ref_index(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.pool
            .method_ref_entry(owner, name, descriptor)
            .unwrap()
            .index()
    }

    fn member(&mut self, flags: u16, name: &str, descriptor: &str, attributes: &[(&str, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        write_be(&mut out, flags);
        write_be(&mut out, self.utf8_index(name));
        write_be(&mut out, self.utf8_index(descriptor));
        write_be(&mut out, attributes.len() as u16);
        for (name, payload) in attributes {
            let attribute = self.attribute(name, payload);
            out.extend_from_slice(&attribute);
        }
        out
    }

    fn attribute(&mut self, name: &str, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        write_be(&mut out, self.utf8_index(name));
        write_be(&mut out, payload.len() as u32);
        out.extend_from_slice(payload);
        out
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::new();
        write_be(&mut out, CLASS_MAGIC);
        write_be(&mut out, self.version.1);
        write_be(&mut out, self.version.0);
        self.pool.write_to(&mut out);
        write_be(&mut out, self.flags);
        write_be(&mut out, self.this_class);
        write_be(&mut out, self.superclass);
        write_be(&mut out, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            write_be(&mut out, *interface);
        }
        for table in [&self.fields, &self.methods] {
            write_be(&mut out, table.len() as u16);
            for member in table {
                out.extend_from_slice(member);
            }
        }
        write_be(&mut out, self.attributes.len() as u16);
        for attribute in &self.attributes {
            out.extend_from_slice(attribute);
        }
        out
    }
}

/// `com/example/Point implements java/lang/Comparable` with fields `x:I` and `y:I`, a
/// constructor with a `Code` attribute, and a `SourceFile` attribute.
pub fn point_class_bytes() -> Vec<u8> {
    let mut class = ClassBytesBuilder::new("com/example/Point").interface("java/lang/Comparable");

    let init = class.method_ref_index("java/lang/Object", "<init>", "()V");
    let mut code = Vec::new();
    write_be(&mut code, 1u16); // max_stack
    write_be(&mut code, 1u16); // max_locals
    write_be(&mut code, 5u32);
    code.push(0x2a); // aload_0
    code.push(0xb7); // invokespecial
    write_be(&mut code, init);
    code.push(0xb1); // return
    write_be(&mut code, 0u16);
    write_be(&mut code, 0u16);

    let source = class.utf8_index("Point.java");
    class
        .field(0x0002, "x", "I", &[])
        .field(0x0002, "y", "I", &[])
        .method(0x0001, "<init>", "()V", &[("Code", code.as_slice())])
        .class_attribute("SourceFile", &source.to_be_bytes())
        .finish()
}
