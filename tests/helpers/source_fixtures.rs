//! BPMN2 documents shared across integration tests.

use once_cell::sync::Lazy;

/// Namespace header used by every fixture.
const DEFINITIONS_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn2:definitions xmlns:bpmn2="http://www.omg.org/spec/BPMN/20100524/MODEL"
                   xmlns:drools="http://www.jboss.org/drools"
                   id="defs">"#;

const DEFINITIONS_CLOSE: &str = "</bpmn2:definitions>";

/// Wrap declarations and a process body in a `definitions` document.
pub fn document(declarations: &str, process: &str) -> String {
    format!("{DEFINITIONS_OPEN}\n{declarations}\n{process}\n{DEFINITIONS_CLOSE}\n")
}

/// One user task with an input mapping and one service task.
pub static APPROVAL: Lazy<String> = Lazy::new(|| {
    document(
        r#"  <bpmn2:itemDefinition id="_amountItem" structureRef="java.lang.Integer"/>"#,
        r#"  <bpmn2:process id="approval" name="Approval" drools:packageName="com.example" drools:version="1.0">
    <bpmn2:property id="amount" itemSubjectRef="_amountItem"/>
    <bpmn2:startEvent id="_start"/>
    <bpmn2:userTask id="_approve" name="Approve">
      <bpmn2:ioSpecification>
        <bpmn2:dataInput id="_approve_amountIn" name="in_amount" itemSubjectRef="_amountItem"/>
      </bpmn2:ioSpecification>
      <bpmn2:dataInputAssociation>
        <bpmn2:sourceRef>amount</bpmn2:sourceRef>
        <bpmn2:targetRef>_approve_amountIn</bpmn2:targetRef>
      </bpmn2:dataInputAssociation>
    </bpmn2:userTask>
    <bpmn2:serviceTask id="_notify" name="NotifyUser" implementation="com.example.Notifier"/>
    <bpmn2:endEvent id="_end"/>
  </bpmn2:process>"#,
    )
});

/// Two user tasks sharing the name "Review".
pub static DUPLICATE_REVIEW: Lazy<String> = Lazy::new(|| {
    document(
        "",
        r#"  <bpmn2:process id="reviews">
    <bpmn2:userTask id="_r1" name="Review"/>
    <bpmn2:subProcess id="_sub">
      <bpmn2:userTask id="_r2" name="Review"/>
    </bpmn2:subProcess>
  </bpmn2:process>"#,
    )
});

/// A call to a process that is never deployed.
pub static CALLER: Lazy<String> = Lazy::new(|| {
    document(
        "",
        r#"  <bpmn2:process id="caller">
    <bpmn2:callActivity id="_call" name="Delegate" calledElement="sub-proc-1"/>
  </bpmn2:process>"#,
    )
});

/// A process whose task element is never closed.
pub const UNTERMINATED: &str = r#"<bpmn2:definitions xmlns:bpmn2="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <bpmn2:process id="broken">
    <bpmn2:userTask id="_t" name="Dangling">
"#;

/// Everything the builder understands, for consistency checks.
pub static ORDER_FULFILMENT: Lazy<String> = Lazy::new(|| {
    document(
        r#"  <bpmn2:itemDefinition id="_orderItem" structureRef="org.acme.Order"/>
  <bpmn2:itemDefinition id="_boolItem" structureRef="java.lang.Boolean"/>
  <bpmn2:interface id="_shipping" name="Shipping" implementationRef="org.acme.ShippingService">
    <bpmn2:operation id="_ship" name="ship" implementationRef="ship"/>
  </bpmn2:interface>"#,
        r###"  <bpmn2:process id="orders.fulfilment" name="Fulfilment" drools:packageName="org.acme" drools:version="3">
    <bpmn2:property id="order" itemSubjectRef="_orderItem" drools:entityKind="jpa"/>
    <bpmn2:property id="approved" itemSubjectRef="_boolItem"/>
    <bpmn2:property id="note"/>
    <bpmn2:laneSet id="_lanes">
      <bpmn2:lane id="_sales" name="Sales">
        <bpmn2:flowNodeRef>_check</bpmn2:flowNodeRef>
      </bpmn2:lane>
    </bpmn2:laneSet>
    <bpmn2:userTask id="_check" name="Check order">
      <bpmn2:ioSpecification>
        <bpmn2:dataInput id="_check_orderIn" name="in_order" dtype="org.acme.Order"/>
        <bpmn2:dataInput id="_check_prio" name="Priority"/>
        <bpmn2:dataInput id="_check_group" name="GroupId"/>
        <bpmn2:dataOutput id="_check_okOut" name="out_ok" dtype="java.lang.Boolean"/>
      </bpmn2:ioSpecification>
      <bpmn2:dataInputAssociation>
        <bpmn2:sourceRef>order</bpmn2:sourceRef>
        <bpmn2:targetRef>_check_orderIn</bpmn2:targetRef>
      </bpmn2:dataInputAssociation>
      <bpmn2:dataInputAssociation>
        <bpmn2:targetRef>_check_prio</bpmn2:targetRef>
        <bpmn2:assignment>
          <bpmn2:from xsi:type="bpmn2:tFormalExpression" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">5</bpmn2:from>
          <bpmn2:to>_check_prio</bpmn2:to>
        </bpmn2:assignment>
      </bpmn2:dataInputAssociation>
      <bpmn2:dataInputAssociation>
        <bpmn2:targetRef>_check_group</bpmn2:targetRef>
        <bpmn2:assignment>
          <bpmn2:from>sales,managers</bpmn2:from>
          <bpmn2:to>_check_group</bpmn2:to>
        </bpmn2:assignment>
      </bpmn2:dataInputAssociation>
      <bpmn2:dataOutputAssociation>
        <bpmn2:sourceRef>_check_okOut</bpmn2:sourceRef>
        <bpmn2:targetRef>approved</bpmn2:targetRef>
      </bpmn2:dataOutputAssociation>
    </bpmn2:userTask>
    <bpmn2:boundaryEvent id="_timeout" attachedToRef="_check" cancelActivity="false">
      <bpmn2:timerEventDefinition id="_timer"/>
    </bpmn2:boundaryEvent>
    <bpmn2:serviceTask id="_shipTask" name="Ship" implementation="##WebService" operationRef="_ship">
      <bpmn2:ioSpecification>
        <bpmn2:dataInput id="_ship_orderIn" name="order" dtype="org.acme.Order"/>
      </bpmn2:ioSpecification>
      <bpmn2:dataInputAssociation>
        <bpmn2:sourceRef>order</bpmn2:sourceRef>
        <bpmn2:targetRef>_ship_orderIn</bpmn2:targetRef>
      </bpmn2:dataInputAssociation>
    </bpmn2:serviceTask>
    <bpmn2:subProcess id="_returns" name="Returns">
      <bpmn2:userTask id="_inspect" name="Inspect" drools:formName="inspection"/>
      <bpmn2:callActivity id="_refund" calledElement="orders.refund" waitForCompletion="false"/>
    </bpmn2:subProcess>
    <bpmn2:callActivity id="_invoice" calledElement="orders.invoice"/>
    <bpmn2:callActivity id="_invoice2" calledElement="orders.invoice"/>
  </bpmn2:process>"###,
    )
});

/// Process ids of every well-formed fixture, paired with its document.
pub fn deployable() -> Vec<(&'static str, &'static str)> {
    vec![
        ("approval", APPROVAL.as_str()),
        ("caller", CALLER.as_str()),
        ("orders.fulfilment", ORDER_FULFILMENT.as_str()),
    ]
}
